// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! A cheap "does this look like a JPEG" check, used to decide whether a
//! byte stream is worth handing to the splitter at all. Deliberately
//! simpler than `examples/original_source/media_parser.go`'s
//! `LooksLikeFormat`, which also checks for a trailing EOI: this crate's
//! contract only promises the three-byte SOI prefix, since requiring the
//! trailing bytes would force buffering the whole stream up front.

/// The three leading bytes every JPEG stream starts with: `0xFF 0xD8 0xFF`.
const JPEG_PREFIX: [u8; 3] = [0xff, 0xd8, 0xff];

/// True if `bytes` starts with the JPEG SOI-and-next-marker prefix.
pub fn
looks_like_format
(
	bytes: &[u8]
)
-> bool
{
	bytes.starts_with(&JPEG_PREFIX)
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn
	accepts_jpeg_prefix()
	{
		assert!(looks_like_format(&[0xff, 0xd8, 0xff, 0xe0]));
	}

	#[test]
	fn
	rejects_short_or_wrong_prefix()
	{
		assert!(!looks_like_format(&[0xff, 0xd8]));
		assert!(!looks_like_format(&[0x89, 0x50, 0x4e, 0x47]));
	}
}
