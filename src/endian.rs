// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

/// Byte order used by a TIFF/IFD blob. Mirrors the two-letter marker at the
/// start of the TIFF header ("II" for little, "MM" for big).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum
Endian
{
	Big,
	Little
}

impl
Endian
{
	/// The two-byte order mark plus the 0x002A magic number that every TIFF
	/// header starts with, in this endian's byte order.
	pub fn
	header
	(
		&self
	)
	-> [u8; 4]
	{
		match *self
		{
			Endian::Little => [0x49, 0x49, 0x2a, 0x00],
			Endian::Big    => [0x4d, 0x4d, 0x00, 0x2a],
		}
	}

	/// Determines the endian from the first two bytes of a TIFF header.
	pub fn
	from_header_bytes
	(
		bytes: &[u8]
	)
	-> Option<Endian>
	{
		if bytes.len() < 2
		{
			return None;
		}

		match &bytes[0..2]
		{
			[0x49, 0x49] => Some(Endian::Little),
			[0x4d, 0x4d] => Some(Endian::Big),
			_            => None,
		}
	}
}
