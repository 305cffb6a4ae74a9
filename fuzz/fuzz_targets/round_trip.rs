#![no_main]

use libfuzzer_sys::fuzz_target;
use libfuzzer_sys::Corpus;

use jpeg_segments::media_parser::JpegMediaParser;
use jpeg_segments::media_parser::MediaParser;

fuzz_target!(|data: &[u8]| -> Corpus {
	let parser = JpegMediaParser;

	let Ok(segments) = parser.parse_bytes(data) else { return Corpus::Reject };

	let mut out = Vec::with_capacity(data.len());
	segments.write(&mut out).expect("writing to an in-memory Vec never fails");

	pretty_assertions::assert_eq!(out, data, "re-serializing an unmodified SegmentList must reproduce the input exactly");

	Corpus::Keep
});
