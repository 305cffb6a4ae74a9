// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! The marker table: a compile-time constant mapping from a marker byte to
//! its name, payload length class and structural kind. Grounded in
//! `examples/original_source/jpeg.go`'s `markerLen` table and
//! `segment.go`'s `markerNames`, generalized to a single `const fn` lookup
//! per the "keep it a compile-time constant" Design Note.

pub const SOI:  u8 = 0xd8;
pub const EOI:  u8 = 0xd9;
pub const SOS:  u8 = 0xda;
pub const DQT:  u8 = 0xdb;
pub const DHT:  u8 = 0xc4;
pub const APP0: u8 = 0xe0;
pub const APP1: u8 = 0xe1;
pub const APP13: u8 = 0xed;

/// Synthetic marker id used for the entropy-coded scan body, which has no
/// real marker byte of its own in the bitstream.
pub const SCAN_DATA: u8 = 0x00;

/// How a marker's payload length is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum
LengthClass
{
	/// No payload at all (SOI, EOI, RSTn, TEM).
	Zero,

	/// A 16-bit big-endian length field (inclusive of itself) precedes the
	/// payload.
	TwoByteBe,
}

/// The structural role a marker plays in the splitter's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum
MarkerKind
{
	Soi,
	Eoi,
	Sos,
	Sof,
	Appn,
	Dqt,
	Dht,
	Other,
	/// The synthetic entropy-coded scan body (`0x00`, "!SCANDATA").
	ScanData,
}

/// A marker record: everything the splitter and segment list need to know
/// about a marker byte without decoding its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct
MarkerInfo
{
	pub name:         &'static str,
	pub length_class: LengthClass,
	pub kind:         MarkerKind,
}

/// True for the restart markers 0xD0-0xD7, which may appear inside
/// entropy-coded scan data without ending the scan.
pub const fn
is_restart
(
	marker_id: u8
)
-> bool
{
	marker_id >= 0xd0 && marker_id <= 0xd7
}

/// True for the application marker range 0xE0-0xEF.
pub const fn
is_appn
(
	marker_id: u8
)
-> bool
{
	marker_id >= 0xe0 && marker_id <= 0xef
}

/// True for the start-of-frame range, excluding DHT (0xC4) and JPG (0xC8)
/// which share the numeric range but are not frame headers.
pub const fn
is_sof
(
	marker_id: u8
)
-> bool
{
	matches!(marker_id,
		0xc0..=0xc3 | 0xc5..=0xc7 | 0xc9..=0xcb | 0xcd..=0xcf
	)
}

/// Looks up the static record for a marker byte. Every byte has *some*
/// record - unrecognized bytes fall back to a length-prefixed "OTHER"
/// marker, matching the original's behavior of treating unknown markers as
/// opaque, length-bearing segments rather than rejecting them outright.
pub const fn
lookup
(
	marker_id: u8
)
-> MarkerInfo
{
	if marker_id == SCAN_DATA
	{
		return MarkerInfo { name: "!SCANDATA", length_class: LengthClass::Zero, kind: MarkerKind::ScanData };
	}

	if marker_id == SOI
	{
		return MarkerInfo { name: "SOI", length_class: LengthClass::Zero, kind: MarkerKind::Soi };
	}

	if marker_id == EOI
	{
		return MarkerInfo { name: "EOI", length_class: LengthClass::Zero, kind: MarkerKind::Eoi };
	}

	if marker_id == 0x01
	{
		return MarkerInfo { name: "TEM", length_class: LengthClass::Zero, kind: MarkerKind::Other };
	}

	if is_restart(marker_id)
	{
		return MarkerInfo { name: "RST", length_class: LengthClass::Zero, kind: MarkerKind::Other };
	}

	if marker_id == SOS
	{
		return MarkerInfo { name: "SOS", length_class: LengthClass::TwoByteBe, kind: MarkerKind::Sos };
	}

	if marker_id == DQT
	{
		return MarkerInfo { name: "DQT", length_class: LengthClass::TwoByteBe, kind: MarkerKind::Dqt };
	}

	if marker_id == DHT
	{
		return MarkerInfo { name: "DHT", length_class: LengthClass::TwoByteBe, kind: MarkerKind::Dht };
	}

	if is_sof(marker_id)
	{
		return MarkerInfo { name: "SOF", length_class: LengthClass::TwoByteBe, kind: MarkerKind::Sof };
	}

	if is_appn(marker_id)
	{
		return MarkerInfo { name: "APPn", length_class: LengthClass::TwoByteBe, kind: MarkerKind::Appn };
	}

	// Every other marker (COM, DRI, DAC, J2C pass-through range, ...) is
	// treated as an opaque, length-prefixed segment. This is deliberately
	// permissive: the splitter's job is to tokenize, not to validate JPEG
	// conformance beyond what that requires (spec Non-goals).
	MarkerInfo { name: "OTHER", length_class: LengthClass::TwoByteBe, kind: MarkerKind::Other }
}

/// A short, human-readable name for a marker id, used by
/// `Segment::embedded_string`. Left-padding to 5 characters is the caller's
/// responsibility, matching the contractual format in spec §4.2.
pub fn
name_of
(
	marker_id: u8
)
-> &'static str
{
	lookup(marker_id).name
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn
	sof_excludes_dht_and_jpg()
	{
		assert!(!is_sof(0xc4)); // DHT
		assert!(!is_sof(0xc8)); // JPG
		assert!(is_sof(0xc0));
		assert!(is_sof(0xcf));
	}

	#[test]
	fn
	restart_range()
	{
		for id in 0xd0u8..=0xd7u8
		{
			assert!(is_restart(id));
		}
		assert!(!is_restart(0xd8));
	}

	#[test]
	fn
	scan_data_is_zero_length()
	{
		let info = lookup(SCAN_DATA);
		assert_eq!(info.kind, MarkerKind::ScanData);
		assert_eq!(info.length_class, LengthClass::Zero);
	}
}
