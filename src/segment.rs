// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! A single tokenized JPEG segment and the operations that read or rewrite
//! its payload in place.

use sha1::Digest;
use sha1::Sha1;

use crate::error::Error;
use crate::ifd;
use crate::iptc;
use crate::marker;
use crate::xmp;

/// The 6-byte Exif APP1 prefix, immediately followed by a TIFF header.
const EXIF_PREFIX: &[u8] = b"Exif\0\0";

/// The 29-byte Adobe XMP APP1 prefix.
const XMP_PREFIX: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// The Photoshop APP13 prefix that precedes an 8BIM resource block stream.
const IPTC_PREFIX: &[u8] = b"Photoshop 3.0\0";

/// One marker's worth of a JPEG bitstream: its marker byte, the byte offset
/// at which its payload starts in the original stream, and the raw payload
/// bytes (for `!SCANDATA`, the entropy-coded scan body with byte-stuffing
/// intact).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct
Segment
{
	pub(crate) marker_id: u8,
	pub(crate) offset:    u64,
	pub(crate) data:      Vec<u8>,
}

impl
Segment
{
	pub fn
	new
	(
		marker_id: u8,
		offset:    u64,
		data:      Vec<u8>,
	)
	-> Segment
	{
		Segment { marker_id, offset, data }
	}

	pub fn
	marker_id
	(
		&self
	)
	-> u8
	{
		self.marker_id
	}

	/// The static name of this segment's marker, e.g. `"APPn"`, `"SOS"`.
	pub fn
	marker_name
	(
		&self
	)
	-> &'static str
	{
		marker::name_of(self.marker_id)
	}

	/// Byte offset at which this segment begins in the stream it was split
	/// from: the position of the leading `0xFF` of the segment's marker, or
	/// for the synthetic `!SCANDATA` pseudo-segment (which has no marker of
	/// its own), the position of the first byte of entropy data.
	pub fn
	offset
	(
		&self
	)
	-> u64
	{
		self.offset
	}

	pub fn
	data
	(
		&self
	)
	-> &[u8]
	{
		&self.data
	}

	/// True for an APP1 segment carrying the Exif prefix.
	pub fn
	is_exif
	(
		&self
	)
	-> bool
	{
		self.marker_id == marker::APP1 && self.data.starts_with(EXIF_PREFIX)
	}

	/// True for an APP1 segment carrying the Adobe XMP prefix.
	pub fn
	is_xmp
	(
		&self
	)
	-> bool
	{
		self.marker_id == marker::APP1 && self.data.starts_with(XMP_PREFIX)
	}

	/// True for an APP13 segment carrying the Photoshop IPTC prefix.
	pub fn
	is_iptc
	(
		&self
	)
	-> bool
	{
		self.marker_id == marker::APP13 && self.data.starts_with(IPTC_PREFIX)
	}

	/// The raw TIFF blob following the `Exif\0\0` prefix, or `None` if this
	/// segment is not an Exif segment.
	pub fn
	exif_raw
	(
		&self
	)
	-> Option<&[u8]>
	{
		if !self.is_exif()
		{
			return None;
		}

		Some(&self.data[EXIF_PREFIX.len()..])
	}

	/// Decodes this segment's Exif TIFF blob into an IFD chain.
	pub fn
	exif_decode
	(
		&self
	)
	-> Result<ifd::IfdChain, Error>
	{
		let raw = self.exif_raw().ok_or(Error::NoExif)?;
		ifd::decode_chain(raw).map_err(Error::ExifDecodeFailed)
	}

	/// Decodes this segment's Exif data and flattens the IFD chain into a
	/// single breadth-first ordered list of entries (IFD0, then its SubIFDs
	/// such as ExifIFD, then IFD1, ...).
	pub fn
	exif_flat
	(
		&self
	)
	-> Result<Vec<ifd::FlatEntry>, Error>
	{
		Ok(self.exif_decode()?.flatten())
	}

	/// Replaces this segment's payload with a freshly encoded Exif TIFF
	/// blob built from `chain`. The `Segment`'s identity (marker id) is
	/// preserved; only `data` and its derived `offset`-relative length
	/// change.
	pub fn
	set_exif
	(
		&mut self,
		chain: &ifd::IfdChain,
	)
	-> Result<(), Error>
	{
		let encoded = ifd::ifd_byte_encoder::encode_to_exif(chain).map_err(Error::ExifEncodeFailed)?;

		let mut data = Vec::with_capacity(EXIF_PREFIX.len() + encoded.len());
		data.extend_from_slice(EXIF_PREFIX);
		data.extend_from_slice(&encoded);
		self.data = data;

		Ok(())
	}

	/// Re-serializes an XMP packet with indentation for human inspection.
	/// Returns the packet as UTF-8 text with the Adobe prefix stripped.
	pub fn
	formatted_xmp
	(
		&self
	)
	-> Result<String, Error>
	{
		if !self.is_xmp()
		{
			return Err(Error::NoXmp);
		}

		xmp::pretty_print(&self.data[XMP_PREFIX.len()..])
	}

	/// Decodes this segment's 8BIM resource blocks into simplified
	/// (tag name, value) pairs, keeping only recognized, single-valued
	/// standard tags, sorted by name.
	pub fn
	iptc_simple
	(
		&self
	)
	-> Result<Vec<(&'static str, String)>, Error>
	{
		if !self.is_iptc()
		{
			return Err(Error::NoIptc);
		}

		Ok(iptc::decode_simple(&self.data[IPTC_PREFIX.len()..]))
	}

	/// Decodes this segment's 8BIM resource blocks into every (record:tag,
	/// value) pair present, sorted by name.
	pub fn
	iptc_full
	(
		&self
	)
	-> Result<Vec<(String, String)>, Error>
	{
		if !self.is_iptc()
		{
			return Err(Error::NoIptc);
		}

		Ok(iptc::decode_full(&self.data[IPTC_PREFIX.len()..]))
	}

	/// A one-line diagnostic summary of this segment, in the exact
	/// contractual format (the CLI's golden output depends on it):
	/// `OFFSET=(0xOFFSET_HEX OFFSET_DEC) ID=(0xMARKER_ID) NAME=[MARKER_NAME] SIZE=(LENGTH) SHA1=[HEX_DIGEST]`.
	/// Grounded on `original_source/segment.go`'s `EmbeddedString`.
	pub fn
	embedded_string
	(
		&self
	)
	-> String
	{
		let mut hasher = Sha1::new();
		hasher.update(&self.data);
		let digest = hasher.finalize();

		let mut hex = String::with_capacity(digest.len() * 2);
		for byte in digest
		{
			hex.push_str(&format!("{:02x}", byte));
		}

		format!(
			"OFFSET=(0x{:08x} {:10}) ID=(0x{:02x}) NAME=[{:<5}] SIZE=({:10}) SHA1=[{}]",
			self.offset,
			self.offset,
			self.marker_id,
			self.marker_name(),
			self.data.len(),
			hex,
		)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn
	exif_prefix_recognized()
	{
		let mut data = EXIF_PREFIX.to_vec();
		data.extend_from_slice(&[0x4d, 0x4d, 0x00, 0x2a, 0, 0, 0, 8]);
		let segment = Segment::new(marker::APP1, 0, data);
		assert!(segment.is_exif());
		assert!(!segment.is_xmp());
	}

	#[test]
	fn
	xmp_prefix_recognized()
	{
		let mut data = XMP_PREFIX.to_vec();
		data.extend_from_slice(b"<x:xmpmeta/>");
		let segment = Segment::new(marker::APP1, 0, data);
		assert!(segment.is_xmp());
		assert!(!segment.is_exif());
	}

	#[test]
	fn
	embedded_string_is_stable()
	{
		let segment = Segment::new(marker::SOI, 0, vec![]);
		let first  = segment.embedded_string();
		let second = segment.embedded_string();
		assert_eq!(first, second);
		assert!(first.contains("SOI"));
	}
}
