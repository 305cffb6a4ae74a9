#![no_main]

use libfuzzer_sys::fuzz_target;
use libfuzzer_sys::Corpus;

use jpeg_segments::media_parser::JpegMediaParser;
use jpeg_segments::media_parser::MediaParser;

fuzz_target!(|data: &[u8]| -> Corpus {
	let parser = JpegMediaParser;

	match parser.parse_bytes(data) {
		Ok(_) => Corpus::Keep,
		Err(jpeg_segments::Error::StoppedEarly { .. }) => Corpus::Keep,
		Err(_) => Corpus::Reject,
	}
});
