// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! An ordered collection of [`Segment`]s plus the search, mutation and
//! re-serialization operations the rest of the crate is built around.
//! Grounded in `examples/original_source/segment_list.go`.

use std::io::Write;

use crate::error::Error;
use crate::ifd;
use crate::marker;
use crate::segment::Segment;

/// An ordered sequence of JPEG segments, from SOI through EOI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct
SegmentList
{
	segments: Vec<Segment>,
}

impl
SegmentList
{
	pub fn
	new
	(
		segments: Vec<Segment>
	)
	-> SegmentList
	{
		SegmentList { segments }
	}

	pub fn
	len
	(
		&self
	)
	-> usize
	{
		self.segments.len()
	}

	pub fn
	is_empty
	(
		&self
	)
	-> bool
	{
		self.segments.is_empty()
	}

	pub fn
	iter
	(
		&self
	)
	-> std::slice::Iter<'_, Segment>
	{
		self.segments.iter()
	}

	pub fn
	segments
	(
		&self
	)
	-> &[Segment]
	{
		&self.segments
	}

	/// Appends a segment to the end of the list.
	pub fn
	add
	(
		&mut self,
		segment: Segment,
	)
	{
		self.segments.push(segment);
	}

	/// The first APP1 segment carrying Exif data, in list order.
	pub fn
	find_exif
	(
		&self
	)
	-> Option<&Segment>
	{
		self.segments.iter().find(|s| s.is_exif())
	}

	pub fn
	find_exif_mut
	(
		&mut self
	)
	-> Option<&mut Segment>
	{
		self.segments.iter_mut().find(|s| s.is_exif())
	}

	/// The first APP1 segment carrying XMP data, in list order.
	pub fn
	find_xmp
	(
		&self
	)
	-> Option<&Segment>
	{
		self.segments.iter().find(|s| s.is_xmp())
	}

	/// The first APP13 segment carrying IPTC data, in list order.
	pub fn
	find_iptc
	(
		&self
	)
	-> Option<&Segment>
	{
		self.segments.iter().find(|s| s.is_iptc())
	}

	/// Removes every Exif-bearing APP1 segment from the list. Intentionally
	/// asymmetric with [`find_exif`](Self::find_exif), which returns only
	/// the first: a JPEG is not expected to carry more than one Exif
	/// segment, so dropping all of them is the conservative cleanup
	/// action, while finding only needs the first one any caller would
	/// actually see.
	pub fn
	drop_exif
	(
		&mut self
	)
	-> bool
	{
		let before = self.segments.len();
		self.segments.retain(|s| !s.is_exif());
		self.segments.len() != before
	}

	/// Builds an [`ifd::IfdBuilder`] seeded from the existing Exif segment,
	/// if any, or a fresh, empty IFD0 builder otherwise.
	pub fn
	construct_exif_builder
	(
		&self
	)
	-> Result<ifd::IfdBuilder, Error>
	{
		match self.find_exif()
		{
			Some(segment) => Ok(segment.exif_decode()?.into_builder()),
			None          => Ok(ifd::new_ifd_builder(ifd::IFD_STANDARD)),
		}
	}

	/// Replaces (or inserts) the Exif segment with one encoding `chain`.
	/// When no Exif segment exists yet, the new one is inserted directly
	/// after the leading SOI segment, matching where encoders
	/// conventionally place it.
	pub fn
	set_exif
	(
		&mut self,
		chain: &ifd::IfdChain,
	)
	-> Result<(), Error>
	{
		if let Some(segment) = self.find_exif_mut()
		{
			return segment.set_exif(chain);
		}

		let mut segment = Segment::new(marker::APP1, 0, b"Exif\0\0".to_vec());
		segment.set_exif(chain)?;

		let insert_at = if self.segments.first().is_some_and(|s| s.marker_id() == marker::SOI) { 1 } else { 0 };
		self.segments.insert(insert_at, segment);

		Ok(())
	}

	/// Checks the structural minimum this crate requires of a segment
	/// list: a leading SOI and a trailing EOI, and that every segment's
	/// recorded offset actually falls within `original_bytes` (the buffer
	/// this list was split from). The `MinimumSegmentsNotFound` error
	/// message is contractual and must not change.
	pub fn
	validate
	(
		&self,
		original_bytes: &[u8],
	)
	-> Result<(), Error>
	{
		let starts_with_soi = self.segments.first().is_some_and(|s| s.marker_id() == marker::SOI);
		let ends_with_eoi   = self.segments.last().is_some_and(|s| s.marker_id() == marker::EOI);

		if self.segments.len() < 2 || !starts_with_soi || !ends_with_eoi
		{
			return Err(Error::MinimumSegmentsNotFound);
		}

		for segment in &self.segments
		{
			if segment.offset() as usize >= original_bytes.len()
			{
				return Err(Error::OffsetOutOfRange);
			}
		}

		Ok(())
	}

	/// Re-serializes every segment back into bytes, in list order. The
	/// result round-trips bit-exactly with the original stream this list
	/// was split from, provided no segment was mutated.
	pub fn
	write
	<W: Write>
	(
		&self,
		sink: &mut W,
	)
	-> std::io::Result<()>
	{
		for segment in &self.segments
		{
			write_segment(sink, segment)?;
		}

		Ok(())
	}

	/// A human-readable, one-line-per-segment dump, in the same format as
	/// [`Segment::embedded_string`].
	pub fn
	dump
	(
		&self
	)
	-> String
	{
		self.segments.iter().map(|s| s.embedded_string()).collect::<Vec<_>>().join("\n")
	}
}

fn
write_segment
<W: Write>
(
	sink:    &mut W,
	segment: &Segment,
)
-> std::io::Result<()>
{
	let marker_id = segment.marker_id();

	if marker_id == marker::SCAN_DATA
	{
		sink.write_all(segment.data())?;
		return Ok(());
	}

	sink.write_all(&[0xff, marker_id])?;

	let info = marker::lookup(marker_id);
	if info.length_class == marker::LengthClass::TwoByteBe
	{
		let length = (segment.data().len() + 2) as u16;
		sink.write_all(&length.to_be_bytes())?;
	}

	sink.write_all(segment.data())?;
	Ok(())
}

impl IntoIterator for SegmentList
{
	type Item = Segment;
	type IntoIter = std::vec::IntoIter<Segment>;

	fn into_iter(self) -> Self::IntoIter
	{
		self.segments.into_iter()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn
	minimal_list
	(
	)
	-> SegmentList
	{
		SegmentList::new(vec![
			Segment::new(marker::SOI, 0, vec![]),
			Segment::new(marker::EOI, 2, vec![]),
		])
	}

	#[test]
	fn
	validate_rejects_missing_eoi()
	{
		let list = SegmentList::new(vec![Segment::new(marker::SOI, 0, vec![])]);
		let err  = list.validate(&[0xff, 0xd8]).unwrap_err();
		assert_eq!(err.to_string(), "minimum segments not found");
	}

	#[test]
	fn
	validate_accepts_soi_eoi()
	{
		assert!(minimal_list().validate(&[0xff, 0xd8, 0xff, 0xd9]).is_ok());
	}

	#[test]
	fn
	validate_rejects_offset_out_of_range()
	{
		let list = SegmentList::new(vec![
			Segment::new(marker::SOI, 0, vec![]),
			Segment::new(marker::EOI, 100, vec![]),
		]);
		let err = list.validate(&[0xff, 0xd8, 0xff, 0xd9]).unwrap_err();
		assert!(matches!(err, Error::OffsetOutOfRange));
	}

	#[test]
	fn
	drop_exif_removes_all_matches()
	{
		let mut list = minimal_list();
		let mut exif_data = b"Exif\0\0".to_vec();
		exif_data.extend_from_slice(&[0x4d, 0x4d, 0, 0x2a, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0]);
		list.add(Segment::new(marker::APP1, 2, exif_data.clone()));
		list.add(Segment::new(marker::APP1, 2, exif_data));

		assert!(list.drop_exif());
		assert!(list.find_exif().is_none());
	}

	#[test]
	fn
	round_trip_write_matches_input()
	{
		let list = minimal_list();
		let mut out = Vec::new();
		list.write(&mut out).unwrap();
		assert_eq!(out, vec![0xff, 0xd8, 0xff, 0xd9]);
	}
}
