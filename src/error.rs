// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! Error taxonomy for the whole crate: input-shape errors produced by the
//! splitter, semantic errors produced by search operations on a
//! [`SegmentList`](crate::segment_list::SegmentList), and downstream errors
//! wrapping the IFD bridge's own error type.

use crate::ifd::IfdError;
use crate::segment_list::SegmentList;

/// A fallible visitor callback failed; the inner error is opaque to the
/// splitter, which only has to propagate it.
pub type VisitorError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum
Error
{
	/// The byte stream did not start with the JPEG SOI marker.
	#[error("not a JPEG: missing SOI marker")]
	NotJpeg,

	/// The stream ran out of bytes in the middle of a segment.
	#[error("truncated JPEG stream")]
	Truncated,

	/// The stream ended before an EOI marker was seen. A soft diagnostic —
	/// the segments collected up to that point are still usable.
	#[error("JPEG stream stopped before EOI ({} segments recovered)", .partial.len())]
	StoppedEarly
	{
		partial: SegmentList,
	},

	/// A segment or SOF visitor callback returned an error.
	#[error("visitor callback failed")]
	VisitorFailed(#[source] VisitorError),

	/// No EXIF-bearing APP1 segment is present.
	#[error("no EXIF data found")]
	NoExif,

	/// No XMP-bearing APP1 segment is present.
	#[error("no XMP data found")]
	NoXmp,

	/// No IPTC-bearing APP13 segment is present.
	#[error("no IPTC data found")]
	NoIptc,

	/// A [`SegmentList`](crate::segment_list::SegmentList) did not contain
	/// at least an SOI and an EOI segment. The message is contractual.
	#[error("minimum segments not found")]
	MinimumSegmentsNotFound,

	/// Decoding the IFD chain out of an EXIF APP1 payload failed.
	#[error("failed to decode EXIF data")]
	ExifDecodeFailed(#[source] IfdError),

	/// Encoding an IFD builder tree back into an EXIF APP1 payload failed.
	#[error("failed to encode EXIF data")]
	ExifEncodeFailed(#[source] IfdError),

	/// Pretty-printing an XMP payload failed.
	#[error("failed to format XMP data")]
	XmpFormatFailed(#[source] quick_xml::Error),

	/// An offset recorded in a [`SegmentList`](crate::segment_list::SegmentList)
	/// falls outside the original byte buffer it is validated against.
	#[error("segment offset out of range")]
	OffsetOutOfRange,
}

pub type Result<T> = std::result::Result<T, Error>;
