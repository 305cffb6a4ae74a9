// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! The forward-only tokenizer that turns a byte stream into a
//! [`SegmentList`]. A pull-based state machine driven entirely by the
//! caller's read loop: no `Seek` bound is required anywhere. Grounded in
//! `examples/original_source/v2/splitter.go` and its one-byte-pushback
//! handling of scan-data termination, adapted here by carrying the already
//! read marker byte forward as a "pending marker" instead of unreading it.

use std::io::Read;

use log::trace;
use log::warn;

use crate::error::Error;
use crate::error::VisitorError;
use crate::marker;
use crate::segment::Segment;
use crate::segment_list::SegmentList;
use crate::util::read_1_byte;
use crate::util::read_be_u16;
use crate::util::read_n_bytes;

/// The handful of fields decoded out of a Start-Of-Frame segment's payload:
/// enough to describe the image's basic raster shape without pulling in a
/// full JPEG frame-header parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct
SofDescriptor
{
	pub bits_per_sample:  u8,
	pub height:           u16,
	pub width:            u16,
	pub component_count:  u8,
}

fn
parse_sof
(
	payload: &[u8]
)
-> Option<SofDescriptor>
{
	if payload.len() < 6
	{
		return None;
	}

	Some(SofDescriptor
	{
		bits_per_sample: payload[0],
		height:          u16::from_be_bytes([payload[1], payload[2]]),
		width:           u16::from_be_bytes([payload[3], payload[4]]),
		component_count: payload[5],
	})
}

/// Wraps a `Read` source and counts the bytes pulled through it, so
/// segment offsets can be recorded without requiring `Seek`.
struct
CountingReader
<R: Read>
{
	inner: R,
	count: u64,
}

impl<R: Read>
CountingReader<R>
{
	fn
	new
	(
		inner: R
	)
	-> CountingReader<R>
	{
		CountingReader { inner, count: 0 }
	}
}

impl<R: Read> Read for CountingReader<R>
{
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>
	{
		let n = self.inner.read(buf)?;
		self.count += n as u64;
		Ok(n)
	}
}

/// Splits `source` into a [`SegmentList`] with no visitor callbacks.
pub fn
split
<R: Read>
(
	source: R
)
-> Result<SegmentList, Error>
{
	split_with_visitors(source, |_| Ok(()), |_| Ok(()))
}

/// Splits `source` into a [`SegmentList`], invoking `on_segment` as each
/// segment is produced and `on_sof` whenever a Start-Of-Frame segment is
/// decoded. Either callback returning an error aborts the split with
/// [`Error::VisitorFailed`].
pub fn
split_with_visitors
<R, OnSegment, OnSof>
(
	source:     R,
	mut on_segment: OnSegment,
	mut on_sof:     OnSof,
)
-> Result<SegmentList, Error>
where
	R:         Read,
	OnSegment: FnMut(&Segment) -> Result<(), VisitorError>,
	OnSof:     FnMut(&SofDescriptor) -> Result<(), VisitorError>,
{
	let mut source = CountingReader::new(source);
	let mut segments: Vec<Segment> = Vec::new();

	let soi_marker = read_1_byte(&mut source)?;
	let soi_value  = read_1_byte(&mut source)?;
	if soi_marker != 0xff || soi_value != marker::SOI
	{
		return Err(Error::NotJpeg);
	}

	let soi = Segment::new(marker::SOI, 0, Vec::new());
	trace!("emitting segment marker=0x{:02x} offset={}", soi.marker_id(), soi.offset());
	on_segment(&soi).map_err(Error::VisitorFailed)?;
	segments.push(soi);

	let mut pending_marker: Option<(u8, u64)> = None;

	loop
	{
		let (marker_id, offset) = match pending_marker.take()
		{
			Some(pair) => pair,
			None       => match read_next_marker_byte(&mut source)
			{
				Ok(pair) => pair,
				Err(Error::Truncated) => return Err(Error::StoppedEarly { partial: SegmentList::new(segments) }),
				Err(e)   => return Err(e),
			},
		};

		let info = marker::lookup(marker_id);

		match info.length_class
		{
			marker::LengthClass::Zero =>
			{
				let segment = Segment::new(marker_id, offset, Vec::new());
				let is_eoi  = marker_id == marker::EOI;

				trace!("emitting segment marker=0x{:02x} offset={}", segment.marker_id(), segment.offset());
				on_segment(&segment).map_err(Error::VisitorFailed)?;
				segments.push(segment);

				if is_eoi
				{
					return Ok(SegmentList::new(segments));
				}
			},
			marker::LengthClass::TwoByteBe =>
			{
				let length = read_be_u16(&mut source)?;
				if length < 2
				{
					return Err(Error::Truncated);
				}
				let payload = read_n_bytes(&mut source, (length - 2) as usize)?;

				if info.kind == marker::MarkerKind::Sof
				{
					match parse_sof(&payload)
					{
						Some(descriptor) => on_sof(&descriptor).map_err(Error::VisitorFailed)?,
						None              => warn!("failed to parse SOF payload at offset {}", offset),
					}
				}

				let is_sos  = info.kind == marker::MarkerKind::Sos;
				let segment = Segment::new(marker_id, offset, payload);
				trace!("emitting segment marker=0x{:02x} offset={}", segment.marker_id(), segment.offset());
				on_segment(&segment).map_err(Error::VisitorFailed)?;
				segments.push(segment);

				if is_sos
				{
					let scan_offset = source.count;
					let (scan_data, next, next_offset) = match read_scan_data(&mut source)
					{
						Ok(triple) => triple,
						Err(Error::Truncated) => return Err(Error::StoppedEarly { partial: SegmentList::new(segments) }),
						Err(e) => return Err(e),
					};

					let scan_segment = Segment::new(marker::SCAN_DATA, scan_offset, scan_data);
					trace!("emitting segment marker=0x{:02x} offset={}", scan_segment.marker_id(), scan_segment.offset());
					on_segment(&scan_segment).map_err(Error::VisitorFailed)?;
					segments.push(scan_segment);

					pending_marker = Some((next, next_offset));
				}
			},
		}
	}
}

/// Reads the `0xFF` prefix and following marker byte, skipping any run of
/// extra `0xFF` fill bytes in between (legal padding before a marker).
/// Returns the marker byte together with the stream offset of the leading
/// `0xFF`, which is the offset a [`Segment`] built from it must report.
fn
read_next_marker_byte
<R: Read>
(
	source: &mut CountingReader<R>
)
-> Result<(u8, u64), Error>
{
	let leading_ff_offset = source.count;

	let prefix = read_1_byte(source)?;
	if prefix != 0xff
	{
		return Err(Error::Truncated);
	}

	let mut marker_id = read_1_byte(source)?;
	while marker_id == 0xff
	{
		marker_id = read_1_byte(source)?;
	}

	Ok((marker_id, leading_ff_offset))
}

/// Reads entropy-coded scan data until the next real marker. `0xFF 0x00`
/// byte-stuffing and embedded restart markers (`0xFF 0xD0`-`0xFF 0xD7`) are
/// kept verbatim in the returned bytes; the terminating marker's byte
/// (already consumed) is returned alongside so the caller can resume
/// without needing to unread it, together with the stream offset of that
/// marker's leading `0xFF`.
fn
read_scan_data
<R: Read>
(
	source: &mut CountingReader<R>
)
-> Result<(Vec<u8>, u8, u64), Error>
{
	let mut data = Vec::new();

	loop
	{
		let leading_ff_offset = source.count;

		let byte = read_1_byte(source)?;
		if byte != 0xff
		{
			data.push(byte);
			continue;
		}

		let mut next = read_1_byte(source)?;
		while next == 0xff
		{
			next = read_1_byte(source)?;
		}

		if next == 0x00
		{
			data.push(0xff);
			data.push(0x00);
			continue;
		}

		if marker::is_restart(next)
		{
			data.push(0xff);
			data.push(next);
			continue;
		}

		return Ok((data, next, leading_ff_offset));
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn
	minimal_jpeg
	(
	)
	-> Vec<u8>
	{
		vec![
			0xff, 0xd8,             // SOI
			0xff, 0xda, 0x00, 0x04, 0x01, 0x02, // SOS, length 4, payload [0x01, 0x02]
			0xaa, 0xbb, 0xff, 0x00, 0xcc,       // scan data with one stuffed 0xFF
			0xff, 0xd9,             // EOI
		]
	}

	#[test]
	fn
	splits_minimal_jpeg()
	{
		let list = split(minimal_jpeg().as_slice()).unwrap();
		let ids: Vec<u8> = list.iter().map(|s| s.marker_id()).collect();
		assert_eq!(ids, vec![marker::SOI, marker::SOS, marker::SCAN_DATA, marker::EOI]);
	}

	#[test]
	fn
	scan_data_preserves_stuffing()
	{
		let list = split(minimal_jpeg().as_slice()).unwrap();
		let scan = list.iter().find(|s| s.marker_id() == marker::SCAN_DATA).unwrap();
		assert_eq!(scan.data(), &[0xaa, 0xbb, 0xff, 0x00, 0xcc]);
	}

	#[test]
	fn
	round_trip_is_bit_exact()
	{
		let original = minimal_jpeg();
		let list = split(original.as_slice()).unwrap();
		let mut out = Vec::new();
		list.write(&mut out).unwrap();
		assert_eq!(out, original);
	}

	#[test]
	fn
	rejects_non_jpeg()
	{
		let err = split([0x00, 0x01, 0x02].as_slice()).unwrap_err();
		assert!(matches!(err, Error::NotJpeg));
	}

	#[test]
	fn
	offset_points_at_leading_marker_byte()
	{
		let list = split(minimal_jpeg().as_slice()).unwrap();
		let sos  = list.iter().find(|s| s.marker_id() == marker::SOS).unwrap();
		assert_eq!(sos.offset(), 2, "SOI occupies bytes 0-1, so the next segment's leading 0xFF sits at offset 2");
	}

	#[test]
	fn
	truncated_stream_yields_stopped_early()
	{
		let mut truncated = minimal_jpeg();
		truncated.truncate(truncated.len() - 2); // drop the EOI
		let err = split(truncated.as_slice()).unwrap_err();
		match err
		{
			Error::StoppedEarly { partial } => assert!(partial.len() >= 2),
			other => panic!("expected StoppedEarly, got {other:?}"),
		}
	}
}
