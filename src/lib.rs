// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! # jpeg_segments
//! A crate for splitting a JPEG byte stream into its constituent segments,
//! rewriting them, and re-serializing bit-exactly, written entirely in
//! Rust. Includes a bridge to the Exif/TIFF-IFD tag model and recognizers
//! for XMP and IPTC metadata carried in `APP1`/`APP13` segments.
//!
//! Interaction is done via the [`JpegMediaParser`](media_parser::JpegMediaParser)
//! struct, which produces a [`SegmentList`](segment_list::SegmentList).
//!
//! # Usage
//! ## Split a JPEG and inspect its Exif data
//! ```no_run
//! use jpeg_segments::media_parser::JpegMediaParser;
//! use jpeg_segments::media_parser::MediaParser;
//!
//! let parser = JpegMediaParser;
//! let segments = parser.parse_file("image.jpg").unwrap();
//!
//! if let Some(exif) = segments.find_exif()
//! {
//!     for entry in exif.exif_flat().unwrap()
//!     {
//!         println!("{}: 0x{:04x}", entry.path, entry.tag);
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![crate_type = "lib"]
#![crate_name = "jpeg_segments"]

mod util;

pub mod endian;
pub mod error;
pub mod format_probe;
pub mod ifd;
pub mod iptc;
pub mod marker;
pub mod media_parser;
pub mod rational;
pub mod segment;
pub mod segment_list;
pub mod splitter;
pub mod xmp;

pub use error::Error;
pub use error::Result;
pub use media_parser::JpegMediaParser;
pub use media_parser::MediaParser;
pub use segment::Segment;
pub use segment_list::SegmentList;
