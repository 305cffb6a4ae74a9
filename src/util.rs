// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

use std::io::Read;

use crate::error::Error;

/// Reads a single byte from the given forward-only source.
pub(crate) fn
read_1_byte
<R: Read>
(
	source: &mut R
)
-> Result<u8, Error>
{
	let mut byte = [0u8; 1];
	source.read_exact(&mut byte).map_err(|_| Error::Truncated)?;
	Ok(byte[0])
}

/// Reads `count` bytes from the given forward-only source.
pub(crate) fn
read_n_bytes
<R: Read>
(
	source: &mut R,
	count:  usize,
)
-> Result<Vec<u8>, Error>
{
	let mut buffer = vec![0u8; count];
	source.read_exact(&mut buffer).map_err(|_| Error::Truncated)?;
	Ok(buffer)
}

/// Reads a 16-bit big-endian integer, as used by every length-prefixed JPEG
/// marker.
pub(crate) fn
read_be_u16
<R: Read>
(
	source: &mut R
)
-> Result<u16, Error>
{
	let bytes = read_n_bytes(source, 2)?;
	Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}
