// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! The top-level entry points: parsing a JPEG from a file, a byte slice or
//! any `Read` source into a [`SegmentList`]. Grounded in
//! `examples/original_source/media_parser.go`'s `MediaParser` interface,
//! narrowed to the one format this crate supports.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Error;
use crate::format_probe;
use crate::segment_list::SegmentList;
use crate::splitter;

/// A parser for one media format that can split an input into a
/// [`SegmentList`].
pub trait
MediaParser
{
	/// Parses an arbitrary `Read` source.
	fn
	parse
	<R: Read>
	(
		&self,
		source: R,
	)
	-> Result<SegmentList, Error>;

	/// Parses an in-memory byte slice.
	fn
	parse_bytes
	(
		&self,
		bytes: &[u8],
	)
	-> Result<SegmentList, Error>
	{
		self.parse(bytes)
	}

	/// Opens and parses a file at `path`.
	fn
	parse_file
	<P: AsRef<Path>>
	(
		&self,
		path: P,
	)
	-> Result<SegmentList, Error>
	{
		let file = File::open(path).map_err(|_| Error::Truncated)?;
		self.parse(file)
	}

	/// A cheap, prefix-only check for whether `bytes` could plausibly be
	/// parsed by this parser.
	fn
	looks_like_format
	(
		&self,
		bytes: &[u8],
	)
	-> bool;
}

/// The only [`MediaParser`] this crate provides: JPEG.
#[derive(Clone, Copy, Debug, Default)]
pub struct
JpegMediaParser;

impl
MediaParser for JpegMediaParser
{
	fn
	parse
	<R: Read>
	(
		&self,
		source: R,
	)
	-> Result<SegmentList, Error>
	{
		splitter::split(source)
	}

	fn
	looks_like_format
	(
		&self,
		bytes: &[u8],
	)
	-> bool
	{
		format_probe::looks_like_format(bytes)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn
	parses_bytes_into_segment_list()
	{
		let parser = JpegMediaParser;
		let bytes  = [0xff, 0xd8, 0xff, 0xd9];
		let list   = parser.parse_bytes(&bytes).unwrap();
		assert_eq!(list.len(), 2);
	}

	#[test]
	fn
	looks_like_format_is_prefix_only()
	{
		let parser = JpegMediaParser;
		assert!(parser.looks_like_format(&[0xff, 0xd8, 0xff]));
		assert!(!parser.looks_like_format(&[0xff, 0xd8]));
	}
}
