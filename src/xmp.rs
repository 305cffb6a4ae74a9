// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! XMP packet recognition and pretty-printing. Grounded in the teacher's
//! use of `quick-xml` for its own embedded-metadata formatting, generalized
//! here into a small re-indenting pass over an arbitrary XMP packet.

use quick_xml::events::Event;
use quick_xml::Reader;
use quick_xml::Writer;

use crate::error::Error;

/// Re-serializes an XMP packet (the bytes following the Adobe APP1 prefix)
/// with two-space indentation, for human inspection. Leading/trailing
/// whitespace around the packet is trimmed first, since many encoders pad
/// the packet out to a fixed size with spaces.
pub fn
pretty_print
(
	raw: &[u8]
)
-> Result<String, Error>
{
	let text = String::from_utf8_lossy(raw);
	let trimmed = text.trim();

	let mut reader = Reader::from_str(trimmed);
	reader.config_mut().trim_text(true);

	let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

	loop
	{
		match reader.read_event().map_err(Error::XmpFormatFailed)?
		{
			Event::Eof => break,
			event      =>
			{
				writer.write_event(event).map_err(Error::XmpFormatFailed)?;
			},
		}
	}

	let bytes = writer.into_inner();
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn
	reindents_compact_packet()
	{
		let packet = b"<x:xmpmeta><rdf:RDF><rdf:Description/></rdf:RDF></x:xmpmeta>";
		let pretty = pretty_print(packet).unwrap();
		assert!(pretty.contains('\n'));
		assert!(pretty.contains("rdf:Description"));
	}

	#[test]
	fn
	rejects_malformed_xml()
	{
		let packet = b"<x:xmpmeta></y:mismatched>";
		assert!(pretty_print(packet).is_err());
	}
}
