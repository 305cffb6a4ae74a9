// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

use proptest::prelude::*;

use jpeg_segments::error::Error;
use jpeg_segments::ifd;
use jpeg_segments::media_parser::JpegMediaParser;
use jpeg_segments::media_parser::MediaParser;
use jpeg_segments::segment::Segment;
use jpeg_segments::segment_list::SegmentList;

fn
app1_segment
(
	data: Vec<u8>
)
-> Vec<u8>
{
	let mut out = vec![0xff, 0xe1];
	out.extend(((data.len() + 2) as u16).to_be_bytes());
	out.extend(data);
	out
}

fn
minimal_exif_payload
(
)
-> Vec<u8>
{
	let mapping = ifd::new_mapping_with_standard();
	let index   = ifd::new_tag_index(&mapping);

	let mut root = ifd::new_ifd_builder(ifd::IFD_STANDARD);
	root.set_standard_with_name(&index, "ProcessingSoftware", ifd::TagValue::Ascii("acme-tool".to_string())).unwrap();

	let exif_ifd = root.get_or_create_ib_from_root_ib(ifd::IFD_EXIF);
	exif_ifd.set_standard_with_name(&index, "UserComment", ifd::TagValue::Undefined(b"hello world".to_vec())).unwrap();

	let chain = root.collect();
	let tiff  = ifd::ifd_byte_encoder::encode_to_exif(&chain).unwrap();

	let mut payload = b"Exif\0\0".to_vec();
	payload.extend(tiff);
	payload
}

fn
xmp_payload
(
)
-> Vec<u8>
{
	let mut payload = b"http://ns.adobe.com/xap/1.0/\0".to_vec();
	payload.extend_from_slice(b"<x:xmpmeta><rdf:RDF><rdf:Description/></rdf:RDF></x:xmpmeta>");
	payload
}

/// Builds a synthetic but structurally faithful JPEG: SOI, an Exif APP1, an
/// XMP APP1, a third generic APP1, DQT, SOF0, DHT, SOS, scan data, EOI.
/// Reproduces the shape of a typical photo's marker sequence without
/// depending on any binary fixture file.
fn
golden_jpeg
(
)
-> Vec<u8>
{
	let mut bytes = vec![0xff, 0xd8];
	bytes.extend(app1_segment(minimal_exif_payload()));
	bytes.extend(app1_segment(xmp_payload()));
	bytes.extend(app1_segment(b"some other APP1 payload".to_vec()));
	bytes.extend([0xff, 0xdb, 0x00, 0x05, 0x00, 0x01, 0x02]); // DQT
	bytes.extend([0xff, 0xc0, 0x00, 0x08, 0x08, 0x00, 0x10, 0x00, 0x10, 0x01]); // SOF0
	bytes.extend([0xff, 0xc4, 0x00, 0x05, 0x00, 0x01, 0x02]); // DHT
	bytes.extend([0xff, 0xda, 0x00, 0x04, 0x00, 0x01]); // SOS
	bytes.extend([0xaa, 0xbb, 0xcc]); // scan data
	bytes.extend([0xff, 0xd9]); // EOI
	bytes
}

#[test]
fn
scenario_a_golden_marker_shape_and_round_trip()
{
	let bytes = golden_jpeg();
	let parser = JpegMediaParser;
	let segments = parser.parse_bytes(&bytes).unwrap();

	let marker_ids: Vec<u8> = segments.iter().map(|s| s.marker_id()).collect();
	assert_eq!(marker_ids, vec![0xd8, 0xe1, 0xe1, 0xe1, 0xdb, 0xc0, 0xc4, 0xda, 0x00, 0xd9]);

	let offsets: Vec<u64> = segments.iter().map(|s| s.offset()).collect();
	for window in offsets.windows(2)
	{
		assert!(window[0] < window[1], "offsets must be strictly increasing");
	}

	let mut out = Vec::new();
	segments.write(&mut out).unwrap();
	assert_eq!(out, bytes);
}

#[test]
fn
scenario_b_exif_and_xmp_prefixes_are_contractual()
{
	let bytes = golden_jpeg();
	let segments = JpegMediaParser.parse_bytes(&bytes).unwrap();

	let exif = segments.find_exif().unwrap();
	assert_eq!(&exif.data()[0..6], b"Exif\0\0");

	let xmp = segments.find_xmp().unwrap();
	assert_eq!(&xmp.data()[0..29], b"http://ns.adobe.com/xap/1.0/\0");
}

#[test]
fn
scenario_c_update_user_comment_preserves_other_tags()
{
	let bytes = golden_jpeg();
	let mut segments = JpegMediaParser.parse_bytes(&bytes).unwrap();
	let before_len = segments.len();

	let mut builder = segments.construct_exif_builder().unwrap();
	let mapping = ifd::new_mapping_with_standard();
	let index   = ifd::new_tag_index(&mapping);

	let exif_ifd = builder.get_or_create_ib_from_root_ib(ifd::IFD_EXIF);
	exif_ifd.set_standard_with_name(&index, "UserComment", ifd::user_comment(ifd::CharacterCode::Ascii, b"TEST COMMENT")).unwrap();

	let chain = builder.collect();
	segments.set_exif(&chain).unwrap();

	assert_eq!(segments.len(), before_len, "updating an existing Exif segment must not change the segment count");

	let flat = segments.find_exif().unwrap().exif_flat().unwrap();
	let user_comment = flat.iter().find(|e| e.tag == 0x9286).unwrap();
	let mut expected_comment = b"ASCII\0\0\0".to_vec();
	expected_comment.extend_from_slice(b"TEST COMMENT");
	assert_eq!(user_comment.value, ifd::TagValue::Undefined(expected_comment));

	let processing_software = flat.iter().find(|e| e.tag == 0x000b).unwrap();
	assert_eq!(processing_software.value, ifd::TagValue::Ascii("acme-tool".to_string()));
}

#[test]
fn
scenario_d_set_exif_from_scratch_inserts_after_soi()
{
	let bytes = golden_jpeg();
	let mut segments = JpegMediaParser.parse_bytes(&bytes).unwrap();

	assert!(segments.drop_exif(), "the golden JPEG starts with an Exif segment to drop");
	assert!(segments.find_exif().is_none());
	let after_drop_len = segments.len();

	let mapping = ifd::new_mapping_with_standard();
	let index   = ifd::new_tag_index(&mapping);
	let mut root = ifd::new_ifd_builder(ifd::IFD_STANDARD);
	root.set_standard_with_name(&index, "ProcessingSoftware", ifd::TagValue::Ascii("from-scratch".to_string())).unwrap();

	segments.set_exif(&root.collect()).unwrap();

	assert_eq!(segments.len(), after_drop_len + 1);
	assert_eq!(segments.segments()[1].marker_id(), 0xe1);
	assert!(segments.segments()[1].is_exif());
}

#[test]
fn
scenario_e_format_probe()
{
	let parser = JpegMediaParser;
	assert!(parser.looks_like_format(&golden_jpeg()));
	assert!(!parser.looks_like_format(b"\x89PNG\r\n\x1a\n"));
	assert!(!parser.looks_like_format(&[0xff, 0xd8]));
}

#[test]
fn
scenario_f_validate_reports_contractual_message()
{
	let list = SegmentList::new(vec![Segment::new(0xd8, 0, vec![])]);
	let err  = list.validate(&[0xff, 0xd8]).unwrap_err();
	assert_eq!(err.to_string(), "minimum segments not found");
	assert!(matches!(err, Error::MinimumSegmentsNotFound));
}

#[test]
fn
drop_exif_then_find_exif_reports_no_exif()
{
	let bytes = golden_jpeg();
	let mut segments = JpegMediaParser.parse_bytes(&bytes).unwrap();
	segments.drop_exif();

	assert!(segments.find_exif().is_none());
}

#[test]
fn
embedded_string_hash_is_deterministic()
{
	let segment = Segment::new(0xdb, 4, vec![1, 2, 3]);
	assert_eq!(segment.embedded_string(), segment.embedded_string());
}

proptest!
{
	/// For any scan payload not itself containing a `0xFF` byte, wrapping
	/// it in a minimal SOI/SOS/EOI shell round-trips bit-exactly. Mirrors
	/// §8's universal `write(parse(b)) = b` property.
	#[test]
	fn
	prop_round_trip_arbitrary_scan_data
	(
		scan_data in proptest::collection::vec(0u8..0xfe, 0..256)
	)
	{
		let mut bytes = vec![0xff, 0xd8, 0xff, 0xda, 0x00, 0x04, 0x00, 0x01];
		bytes.extend(&scan_data);
		bytes.extend([0xff, 0xd9]);

		let segments = JpegMediaParser.parse_bytes(&bytes).unwrap();

		let mut out = Vec::new();
		segments.write(&mut out).unwrap();

		prop_assert_eq!(out, bytes);
	}
}
