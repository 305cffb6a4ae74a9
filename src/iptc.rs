// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! IPTC IIM recognition: the Photoshop APP13 "Image Resource Block" wrapper
//! and the IPTC-NAA dataset stream nested inside resource 0x0404. There is
//! no teacher code for this format (little_exif does not implement IPTC);
//! grounded instead on the publicly documented IPTC-NAA Information
//! Interchange Model and `examples/original_source/`'s general pattern of
//! a type-length-value record stream, adapted to this crate's byte-slice
//! style.

/// The 8BIM resource holding the IPTC-NAA dataset stream.
const IPTC_NAA_RESOURCE_ID: u16 = 0x0404;

/// (record, dataset) -> canonical name, for datasets that carry a single
/// human-readable value. Repeating datasets (e.g. Keywords, dataset 2:25)
/// are deliberately excluded from this table: they don't fit the
/// "simple" single-valued view.
const STANDARD_TAGS: &[(u8, u8, &str)] = &[
	(2, 5,   "ObjectName"),
	(2, 55,  "DateCreated"),
	(2, 80,  "By-line"),
	(2, 85,  "By-lineTitle"),
	(2, 90,  "City"),
	(2, 92,  "Sublocation"),
	(2, 95,  "Province-State"),
	(2, 101, "Country-PrimaryLocationName"),
	(2, 105, "Headline"),
	(2, 110, "Credit"),
	(2, 115, "Source"),
	(2, 116, "CopyrightNotice"),
	(2, 120, "Caption-Abstract"),
];

fn
standard_name
(
	record:  u8,
	dataset: u8,
)
-> Option<&'static str>
{
	STANDARD_TAGS.iter().find(|(r, d, _)| *r == record && *d == dataset).map(|(_, _, name)| *name)
}

/// One raw IPTC dataset: its record:dataset pair and the decoded (latin-1
/// lossily-as-utf8) text value.
struct
Dataset
{
	record:  u8,
	dataset: u8,
	value:   String,
}

/// Extracts the IPTC-NAA dataset stream from the 8BIM image resource
/// blocks, then decodes each dataset.
fn
datasets
(
	resource_blocks: &[u8]
)
-> Vec<Dataset>
{
	let Some(iptc_stream) = find_resource(resource_blocks, IPTC_NAA_RESOURCE_ID) else { return Vec::new() };
	parse_dataset_stream(iptc_stream)
}

/// Walks the 8BIM resource block list looking for one with the given
/// resource id, returning its data slice.
fn
find_resource
(
	bytes:       &[u8],
	resource_id: u16,
)
-> Option<&[u8]>
{
	let mut cursor = 0usize;

	while cursor + 8 <= bytes.len()
	{
		if &bytes[cursor..cursor + 4] != b"8BIM"
		{
			break;
		}

		let id = u16::from_be_bytes([bytes[cursor + 4], bytes[cursor + 5]]);

		let name_len_index = cursor + 6;
		let name_len = *bytes.get(name_len_index)? as usize;
		let mut name_block_len = 1 + name_len;
		if name_block_len % 2 != 0
		{
			name_block_len += 1;
		}

		let size_index = name_len_index + name_block_len;
		if size_index + 4 > bytes.len()
		{
			break;
		}

		let data_size = u32::from_be_bytes(bytes[size_index..size_index + 4].try_into().ok()?) as usize;
		let data_start = size_index + 4;
		if data_start + data_size > bytes.len()
		{
			break;
		}

		let data = &bytes[data_start..data_start + data_size];

		if id == resource_id
		{
			return Some(data);
		}

		let mut padded_size = data_size;
		if padded_size % 2 != 0
		{
			padded_size += 1;
		}

		cursor = data_start + padded_size;
	}

	None
}

/// Parses the IPTC-NAA dataset stream: a sequence of
/// `0x1C record dataset length[2 or extended] value` records.
fn
parse_dataset_stream
(
	bytes: &[u8]
)
-> Vec<Dataset>
{
	let mut out = Vec::new();
	let mut cursor = 0usize;

	while cursor + 5 <= bytes.len()
	{
		if bytes[cursor] != 0x1c
		{
			break;
		}

		let record  = bytes[cursor + 1];
		let dataset = bytes[cursor + 2];
		let length_field = u16::from_be_bytes([bytes[cursor + 3], bytes[cursor + 4]]);

		// Extended tag form (top bit set) is not supported; stop rather
		// than misinterpret the remaining bytes as datasets.
		if length_field & 0x8000 != 0
		{
			break;
		}

		let length = length_field as usize;
		let value_start = cursor + 5;
		if value_start + length > bytes.len()
		{
			break;
		}

		let value = String::from_utf8_lossy(&bytes[value_start..value_start + length]).into_owned();
		out.push(Dataset { record, dataset, value });

		cursor = value_start + length;
	}

	out
}

/// Decodes only the recognized, single-valued standard tags, sorted by
/// name.
pub fn
decode_simple
(
	resource_blocks: &[u8]
)
-> Vec<(&'static str, String)>
{
	let mut out: Vec<(&'static str, String)> = datasets(resource_blocks)
		.into_iter()
		.filter_map(|d| standard_name(d.record, d.dataset).map(|name| (name, d.value)))
		.collect();

	out.sort_by_key(|(name, _)| *name);
	out
}

/// Decodes every (record:dataset, value) pair present, named by their
/// standard tag name where known and by numeric id otherwise, sorted by
/// name.
pub fn
decode_full
(
	resource_blocks: &[u8]
)
-> Vec<(String, String)>
{
	let mut out: Vec<(String, String)> = datasets(resource_blocks)
		.into_iter()
		.map(|d|
		{
			let name = standard_name(d.record, d.dataset).map(str::to_string).unwrap_or_else(|| format!("{}:{}", d.record, d.dataset));
			(name, d.value)
		})
		.collect();

	out.sort_by(|a, b| a.0.cmp(&b.0));
	out
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn
	resource_block
	(
		resource_id: u16,
		data:        &[u8],
	)
	-> Vec<u8>
	{
		let mut out = Vec::new();
		out.extend_from_slice(b"8BIM");
		out.extend_from_slice(&resource_id.to_be_bytes());
		out.push(0); // zero-length Pascal name
		out.push(0); // padding to even
		out.extend_from_slice(&(data.len() as u32).to_be_bytes());
		out.extend_from_slice(data);
		if data.len() % 2 != 0
		{
			out.push(0);
		}
		out
	}

	fn
	dataset
	(
		record:  u8,
		tag:     u8,
		value:   &str,
	)
	-> Vec<u8>
	{
		let mut out = vec![0x1c, record, tag];
		out.extend_from_slice(&(value.len() as u16).to_be_bytes());
		out.extend_from_slice(value.as_bytes());
		out
	}

	#[test]
	fn
	decodes_simple_tags()
	{
		let mut iptc_stream = Vec::new();
		iptc_stream.extend(dataset(2, 5, "Sunset"));
		iptc_stream.extend(dataset(2, 80, "A. Photographer"));

		let blocks = resource_block(IPTC_NAA_RESOURCE_ID, &iptc_stream);
		let simple = decode_simple(&blocks);

		assert_eq!(simple, vec![
			("By-line", "A. Photographer".to_string()),
			("ObjectName", "Sunset".to_string()),
		]);
	}

	#[test]
	fn
	full_view_includes_unknown_datasets()
	{
		let mut iptc_stream = Vec::new();
		iptc_stream.extend(dataset(2, 25, "mountains"));

		let blocks = resource_block(IPTC_NAA_RESOURCE_ID, &iptc_stream);
		let full = decode_full(&blocks);

		assert_eq!(full, vec![("2:25".to_string(), "mountains".to_string())]);
	}
}
