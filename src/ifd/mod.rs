// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! A small, in-crate stand-in for the "external IFD library" that the
//! original implementation delegates TIFF/IFD decoding and encoding to.
//! Grounded in `examples/TechnikTobi-little_exif/src/ifd/mod.rs`'s
//! `ImageFileDirectory::decode_ifd`/`encode_ifd` and `src/metadata.rs`'s
//! tag-by-name lookups, scoped down to the tags this crate actually needs
//! to round-trip: `ProcessingSoftware` (0x000B, IFD0) and `UserComment`
//! (0x9286, ExifIFD). Everything here is internal; nothing is a real
//! external crate.

use std::collections::VecDeque;

use log::debug;

use crate::endian::Endian;
use crate::rational::R64i;
use crate::rational::R64u;

pub mod ifd_byte_encoder;

/// Errors specific to IFD decoding/encoding, wrapped by
/// [`crate::error::Error::ExifDecodeFailed`]/`ExifEncodeFailed`.
#[derive(thiserror::Error, Debug)]
pub enum
IfdError
{
	#[error("TIFF header is missing or malformed")]
	NoExif,

	#[error("tag `{0}` is not a recognized standard tag")]
	TagNotFound(String),

	#[error("malformed IFD structure: {0}")]
	Malformed(&'static str),
}

/// The well-known path of the root image IFD.
pub const IFD_STANDARD: &str = "IFD0";

/// The well-known path of the Exif SubIFD, reachable from IFD0 via tag
/// `0x8769`.
pub const IFD_EXIF: &str = "IFD/Exif";

/// The byte order new Exif blobs are encoded in, absent any other
/// constraint. Big-endian ("MM"), matching the teacher's default.
pub const ENCODE_DEFAULT_BYTE_ORDER: Endian = Endian::Big;

const EXIF_SUBIFD_TAG: u16 = 0x8769;
const GPS_SUBIFD_TAG:  u16 = 0x8825;

/// Maps a dotted SubIFD path to the tag that points to it from its parent.
fn
subifd_tag_for_path
(
	path: &str
)
-> Option<u16>
{
	match path
	{
		IFD_EXIF    => Some(EXIF_SUBIFD_TAG),
		"IFD/GPS"   => Some(GPS_SUBIFD_TAG),
		_           => None,
	}
}

fn
path_for_subifd_tag
(
	tag: u16
)
-> Option<&'static str>
{
	match tag
	{
		EXIF_SUBIFD_TAG => Some(IFD_EXIF),
		GPS_SUBIFD_TAG  => Some("IFD/GPS"),
		_               => None,
	}
}

/// The 8-byte character-code prefix that opens an Exif `UserComment`
/// (tag `0x9286`) value, identifying how the text following it is encoded.
/// Grounded on `examples/original_source/segment_test.go`'s
/// `exifundefined.Tag9286UserComment` construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum
CharacterCode
{
	Ascii,
	Jis,
	Unicode,
	Undefined,
}

impl
CharacterCode
{
	fn
	prefix
	(
		self
	)
	-> [u8; 8]
	{
		match self
		{
			CharacterCode::Ascii     => *b"ASCII\0\0\0",
			CharacterCode::Jis       => *b"JIS\0\0\0\0\0",
			CharacterCode::Unicode   => *b"UNICODE\0",
			CharacterCode::Undefined => [0; 8],
		}
	}
}

/// Builds a `UserComment` tag value: the 8-byte character-code prefix
/// followed by `text`, as an `Undefined`-format value (Exif `UserComment`
/// is always format 7, regardless of which character code it carries).
pub fn
user_comment
(
	code: CharacterCode,
	text: &[u8],
)
-> TagValue
{
	let mut bytes = code.prefix().to_vec();
	bytes.extend_from_slice(text);
	TagValue::Undefined(bytes)
}

/// A decoded or to-be-encoded tag value, tagged with its TIFF format class.
#[derive(Clone, Debug, PartialEq)]
pub enum
TagValue
{
	Bytes(Vec<u8>),
	Ascii(String),
	Shorts(Vec<u16>),
	Longs(Vec<u32>),
	Rationals(Vec<R64u>),
	SRationals(Vec<R64i>),
	Undefined(Vec<u8>),
}

impl
TagValue
{
	fn
	format_code
	(
		&self
	)
	-> u16
	{
		match self
		{
			TagValue::Bytes(_)      => 1,
			TagValue::Ascii(_)      => 2,
			TagValue::Shorts(_)     => 3,
			TagValue::Longs(_)      => 4,
			TagValue::Rationals(_)  => 5,
			TagValue::Undefined(_)  => 7,
			TagValue::SRationals(_) => 10,
		}
	}

	fn
	component_count
	(
		&self
	)
	-> u32
	{
		match self
		{
			TagValue::Bytes(b)      => b.len() as u32,
			TagValue::Ascii(s)      => s.len() as u32 + 1,
			TagValue::Shorts(v)     => v.len() as u32,
			TagValue::Longs(v)      => v.len() as u32,
			TagValue::Rationals(v)  => v.len() as u32,
			TagValue::Undefined(b)  => b.len() as u32,
			TagValue::SRationals(v) => v.len() as u32,
		}
	}

	fn
	encode_bytes
	(
		&self,
		endian: Endian,
	)
	-> Vec<u8>
	{
		match self
		{
			TagValue::Bytes(b)     => b.clone(),
			TagValue::Undefined(b) => b.clone(),
			TagValue::Ascii(s) =>
			{
				let mut out = s.as_bytes().to_vec();
				out.push(0);
				out
			},
			TagValue::Shorts(v) =>
			{
				let mut out = Vec::with_capacity(v.len() * 2);
				for short in v
				{
					out.extend(match endian { Endian::Big => short.to_be_bytes(), Endian::Little => short.to_le_bytes() });
				}
				out
			},
			TagValue::Longs(v) =>
			{
				let mut out = Vec::with_capacity(v.len() * 4);
				for long in v
				{
					out.extend(match endian { Endian::Big => long.to_be_bytes(), Endian::Little => long.to_le_bytes() });
				}
				out
			},
			TagValue::Rationals(v) =>
			{
				let mut out = Vec::with_capacity(v.len() * 8);
				for r in v
				{
					out.extend(crate::rational::r64u_to_bytes(r, &endian));
				}
				out
			},
			TagValue::SRationals(v) =>
			{
				let mut out = Vec::with_capacity(v.len() * 8);
				for r in v
				{
					out.extend(crate::rational::r64i_to_bytes(r, &endian));
				}
				out
			},
		}
	}

	fn
	decode
	(
		format:     u16,
		count:      u32,
		bytes:      &[u8],
		endian:     Endian,
	)
	-> Option<TagValue>
	{
		let count = count as usize;
		match format
		{
			1 => Some(TagValue::Bytes(bytes.to_vec())),
			2 =>
			{
				let text = bytes.iter().take_while(|&&b| b != 0).copied().collect::<Vec<u8>>();
				Some(TagValue::Ascii(String::from_utf8_lossy(&text).into_owned()))
			},
			3 =>
			{
				let mut out = Vec::with_capacity(count);
				for chunk in bytes.chunks_exact(2).take(count)
				{
					out.push(match endian { Endian::Big => u16::from_be_bytes([chunk[0], chunk[1]]), Endian::Little => u16::from_le_bytes([chunk[0], chunk[1]]) });
				}
				Some(TagValue::Shorts(out))
			},
			4 =>
			{
				let mut out = Vec::with_capacity(count);
				for chunk in bytes.chunks_exact(4).take(count)
				{
					let array: [u8; 4] = chunk.try_into().ok()?;
					out.push(match endian { Endian::Big => u32::from_be_bytes(array), Endian::Little => u32::from_le_bytes(array) });
				}
				Some(TagValue::Longs(out))
			},
			5 =>
			{
				let mut out = Vec::with_capacity(count);
				for chunk in bytes.chunks_exact(8).take(count)
				{
					out.push(crate::rational::r64u_from_bytes(chunk, &endian)?);
				}
				Some(TagValue::Rationals(out))
			},
			7 => Some(TagValue::Undefined(bytes.to_vec())),
			10 =>
			{
				let mut out = Vec::with_capacity(count);
				for chunk in bytes.chunks_exact(8).take(count)
				{
					out.push(crate::rational::r64i_from_bytes(chunk, &endian)?);
				}
				Some(TagValue::SRationals(out))
			},
			_ => None,
		}
	}
}

fn
format_element_size
(
	format: u16
)
-> usize
{
	match format
	{
		1 | 2 | 7 => 1,
		3         => 2,
		4         => 4,
		5         => 8,
		9         => 4,
		10        => 8,
		_         => 1,
	}
}

/// One decoded tag: its id and value.
#[derive(Clone, Debug, PartialEq)]
pub struct
IfdEntry
{
	pub tag:   u16,
	pub value: TagValue,
}

/// A single IFD: its own entries, any SubIFDs it points to, and the next
/// IFD in the chain (IFD0 -> IFD1 for a thumbnail, typically).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct
Ifd
{
	pub entries:  Vec<IfdEntry>,
	pub children: Vec<(u16, Box<Ifd>)>,
	pub next:     Option<Box<Ifd>>,
}

/// A fully decoded (or about-to-be-encoded) Exif TIFF blob: byte order plus
/// the root IFD chain.
#[derive(Clone, Debug, PartialEq)]
pub struct
IfdChain
{
	pub endian: Endian,
	pub root:   Ifd,
}

/// One entry from [`IfdChain::flatten`]: the dotted path of the IFD it came
/// from (e.g. `"IFD0"`, `"IFD0/Exif"`), its tag id, and its value.
#[derive(Clone, Debug, PartialEq)]
pub struct
FlatEntry
{
	pub path:  String,
	pub tag:   u16,
	pub value: TagValue,
}

impl
IfdChain
{
	/// Flattens this chain into a single, breadth-first ordered list:
	/// every entry of IFD0, then every entry of its SubIFDs, then every
	/// entry of IFD1 (if chained), and so on.
	pub fn
	flatten
	(
		&self
	)
	-> Vec<FlatEntry>
	{
		let mut out   = Vec::new();
		let mut queue = VecDeque::new();
		queue.push_back(("IFD0".to_string(), &self.root));

		let mut generation = 1;
		let mut cursor = Some(&self.root);
		while let Some(ifd) = cursor
		{
			if let Some(next) = &ifd.next
			{
				queue.push_back((format!("IFD{}", generation), next.as_ref()));
				generation += 1;
			}
			cursor = ifd.next.as_deref();
		}

		while let Some((path, ifd)) = queue.pop_front()
		{
			for entry in &ifd.entries
			{
				out.push(FlatEntry { path: path.clone(), tag: entry.tag, value: entry.value.clone() });
			}

			for (tag, child) in &ifd.children
			{
				let child_path = match path_for_subifd_tag(*tag)
				{
					Some(suffix) => format!("{}/{}", path, suffix.trim_start_matches("IFD/")),
					None         => format!("{}/0x{:04x}", path, tag),
				};
				queue.push_back((child_path, child.as_ref()));
			}
		}

		out
	}

	/// Converts this decoded chain back into a builder rooted at IFD0, so
	/// individual tags can be overwritten before re-encoding.
	pub fn
	into_builder
	(
		&self
	)
	-> IfdBuilder
	{
		ifd_to_builder(IFD_STANDARD, &self.root)
	}
}

fn
ifd_to_builder
(
	identity: &str,
	ifd:      &Ifd,
)
-> IfdBuilder
{
	let mut builder = IfdBuilder::new(identity.to_string());
	builder.entries = ifd.entries.iter().map(|e| (e.tag, e.value.clone())).collect();

	for (tag, child) in &ifd.children
	{
		let child_path = path_for_subifd_tag(*tag).map(str::to_string).unwrap_or_else(|| format!("{}/0x{:04x}", identity, tag));
		builder.children.push((*tag, ifd_to_builder(&child_path, child)));
	}

	builder
}

/// Decodes a raw TIFF blob (the bytes following the `Exif\0\0` prefix) into
/// an [`IfdChain`].
pub fn
decode_chain
(
	raw: &[u8]
)
-> Result<IfdChain, IfdError>
{
	debug!("decoding IFD chain ({} bytes)", raw.len());

	if raw.len() < 8
	{
		return Err(IfdError::NoExif);
	}

	let endian = Endian::from_header_bytes(&raw[0..2]).ok_or(IfdError::NoExif)?;

	let magic_ok = match endian
	{
		Endian::Little => raw[2] == 0x2a && raw[3] == 0x00,
		Endian::Big    => raw[2] == 0x00 && raw[3] == 0x2a,
	};
	if !magic_ok
	{
		return Err(IfdError::NoExif);
	}

	let first_offset = read_u32(&raw[4..8], endian);
	if first_offset == 0
	{
		return Err(IfdError::Malformed("first IFD offset is zero"));
	}

	let root = decode_ifd(raw, first_offset as usize, endian)?;
	Ok(IfdChain { endian, root })
}

fn
read_u32
(
	bytes:  &[u8],
	endian: Endian,
)
-> u32
{
	let array: [u8; 4] = bytes.try_into().unwrap_or([0; 4]);
	match endian { Endian::Big => u32::from_be_bytes(array), Endian::Little => u32::from_le_bytes(array) }
}

fn
read_u16
(
	bytes:  &[u8],
	endian: Endian,
)
-> u16
{
	let array: [u8; 2] = bytes.try_into().unwrap_or([0; 2]);
	match endian { Endian::Big => u16::from_be_bytes(array), Endian::Little => u16::from_le_bytes(array) }
}

fn
decode_ifd
(
	raw:    &[u8],
	offset: usize,
	endian: Endian,
)
-> Result<Ifd, IfdError>
{
	if offset + 2 > raw.len()
	{
		return Err(IfdError::Malformed("IFD offset out of range"));
	}

	let count = read_u16(&raw[offset..offset + 2], endian) as usize;
	let entries_start = offset + 2;
	let entries_end    = entries_start + count * 12;

	if entries_end + 4 > raw.len()
	{
		return Err(IfdError::Malformed("IFD entry table out of range"));
	}

	let mut entries  = Vec::with_capacity(count);
	let mut children = Vec::new();

	for i in 0..count
	{
		let base = entries_start + i * 12;
		let tag    = read_u16(&raw[base..base + 2], endian);
		let format = read_u16(&raw[base + 2..base + 4], endian);
		let comp_count = read_u32(&raw[base + 4..base + 8], endian);
		let value_field = &raw[base + 8..base + 12];

		let element_size = format_element_size(format);
		let total_bytes   = element_size.saturating_mul(comp_count as usize);

		let value_bytes: &[u8] = if total_bytes <= 4
		{
			&value_field[..total_bytes.min(4)]
		}
		else
		{
			let data_offset = read_u32(value_field, endian) as usize;
			if data_offset + total_bytes > raw.len()
			{
				return Err(IfdError::Malformed("tag value out of range"));
			}
			&raw[data_offset..data_offset + total_bytes]
		};

		if subifd_tag_for_path(IFD_EXIF) == Some(tag) || subifd_tag_for_path("IFD/GPS") == Some(tag)
		{
			let child_offset = read_u32(value_field, endian) as usize;
			let child = decode_ifd(raw, child_offset, endian)?;
			children.push((tag, Box::new(child)));
			continue;
		}

		if let Some(value) = TagValue::decode(format, comp_count, value_bytes, endian)
		{
			entries.push(IfdEntry { tag, value });
		}
	}

	let next_offset_field = &raw[entries_end..entries_end + 4];
	let next_offset = read_u32(next_offset_field, endian);

	let next = if next_offset != 0
	{
		Some(Box::new(decode_ifd(raw, next_offset as usize, endian)?))
	}
	else
	{
		None
	};

	Ok(Ifd { entries, children, next })
}

/// A single statically known tag: its id, canonical name and home IFD.
#[derive(Clone, Copy, Debug)]
pub struct
TagDef
{
	pub id:   u16,
	pub name: &'static str,
	pub ifd:  &'static str,
}

const STANDARD_TAGS: &[TagDef] = &[
	TagDef { id: 0x000b, name: "ProcessingSoftware", ifd: IFD_STANDARD },
	TagDef { id: 0x9286, name: "UserComment",        ifd: IFD_EXIF },
];

/// The set of tags this crate knows the name, id and home IFD of. Stands in
/// for the external library's `Mapping` type.
pub struct
Mapping
{
	tags: &'static [TagDef],
}

pub fn
new_mapping_with_standard()
-> Mapping
{
	Mapping { tags: STANDARD_TAGS }
}

/// A lookup index over a [`Mapping`], keyed by tag name.
pub struct
TagIndex<'a>
{
	mapping: &'a Mapping,
}

pub fn
new_tag_index
(
	mapping: &Mapping
)
-> TagIndex<'_>
{
	TagIndex { mapping }
}

impl<'a>
TagIndex<'a>
{
	pub fn
	find_by_name
	(
		&self,
		name: &str,
	)
	-> Option<&'static TagDef>
	{
		self.mapping.tags.iter().find(|t| t.name == name)
	}
}

/// A tree of tag assignments not yet encoded into bytes. Stands in for the
/// external library's `IfdBuilder`.
#[derive(Clone, Debug, Default)]
pub struct
IfdBuilder
{
	identity: String,
	entries:  Vec<(u16, TagValue)>,
	children: Vec<(u16, IfdBuilder)>,
}

pub fn
new_ifd_builder
(
	identity: &str
)
-> IfdBuilder
{
	IfdBuilder::new(identity.to_string())
}

impl
IfdBuilder
{
	fn
	new
	(
		identity: String
	)
	-> IfdBuilder
	{
		IfdBuilder { identity, entries: Vec::new(), children: Vec::new() }
	}

	/// Adds a tag by its standard name, failing if the name isn't
	/// recognized. Does not overwrite an existing value for the same tag.
	pub fn
	add_standard_with_name
	(
		&mut self,
		index: &TagIndex<'_>,
		name:  &str,
		value: TagValue,
	)
	-> Result<(), IfdError>
	{
		let def = index.find_by_name(name).ok_or_else(|| IfdError::TagNotFound(name.to_string()))?;
		self.entries.push((def.id, value));
		Ok(())
	}

	/// Like [`add_standard_with_name`](Self::add_standard_with_name), but
	/// replaces an existing value for the same tag rather than appending a
	/// duplicate.
	pub fn
	set_standard_with_name
	(
		&mut self,
		index: &TagIndex<'_>,
		name:  &str,
		value: TagValue,
	)
	-> Result<(), IfdError>
	{
		let def = index.find_by_name(name).ok_or_else(|| IfdError::TagNotFound(name.to_string()))?;

		if let Some(existing) = self.entries.iter_mut().find(|(tag, _)| *tag == def.id)
		{
			existing.1 = value;
		}
		else
		{
			self.entries.push((def.id, value));
		}

		Ok(())
	}

	pub fn
	find
	(
		&self,
		tag: u16,
	)
	-> Option<&TagValue>
	{
		self.entries.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
	}

	pub fn
	tags
	(
		&self
	)
	-> &[(u16, TagValue)]
	{
		&self.entries
	}

	/// A human-readable listing of this builder's tags and children, for
	/// debugging.
	pub fn
	dump
	(
		&self
	)
	-> String
	{
		let mut out = format!("{}:\n", self.identity);
		for (tag, value) in &self.entries
		{
			out.push_str(&format!("  0x{:04x} = {:?}\n", tag, value));
		}
		for (_, child) in &self.children
		{
			out.push_str(&child.dump());
		}
		out
	}

	/// Navigates from this builder (assumed to be the root, IFD0) to the
	/// SubIFD builder at `path` (e.g. `"IFD/Exif"`), creating it if it does
	/// not exist yet.
	pub fn
	get_or_create_ib_from_root_ib
	(
		&mut self,
		path: &str,
	)
	-> &mut IfdBuilder
	{
		if path == self.identity
		{
			return self;
		}

		let tag = subifd_tag_for_path(path).unwrap_or_else(|| panic!("unknown SubIFD path: {}", path));

		if !self.children.iter().any(|(t, _)| *t == tag)
		{
			self.children.push((tag, IfdBuilder::new(path.to_string())));
		}

		&mut self.children.iter_mut().find(|(t, _)| *t == tag).expect("just inserted").1
	}

	/// Finalizes this builder tree into an [`IfdChain`] ready for encoding.
	pub fn
	collect
	(
		&self
	)
	-> IfdChain
	{
		IfdChain { endian: ENCODE_DEFAULT_BYTE_ORDER, root: self.to_ifd() }
	}

	fn
	to_ifd
	(
		&self
	)
	-> Ifd
	{
		let mut entries: Vec<IfdEntry> = self.entries.iter().map(|(tag, value)| IfdEntry { tag: *tag, value: value.clone() }).collect();

		// Each child gets a placeholder Long entry for its SubIFD pointer
		// tag; the byte encoder patches the real offset in once the child
		// has actually been written out.
		for (tag, _) in &self.children
		{
			entries.push(IfdEntry { tag: *tag, value: TagValue::Longs(vec![0]) });
		}

		Ifd
		{
			entries,
			children: self.children.iter().map(|(tag, child)| (*tag, Box::new(child.to_ifd()))).collect(),
			next:     None,
		}
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn
	sample_chain_bytes
	(
	)
	-> Vec<u8>
	{
		let mapping = new_mapping_with_standard();
		let index   = new_tag_index(&mapping);

		let mut root = new_ifd_builder(IFD_STANDARD);
		root.set_standard_with_name(&index, "ProcessingSoftware", TagValue::Ascii("test".to_string())).unwrap();

		let exif = root.get_or_create_ib_from_root_ib(IFD_EXIF);
		exif.set_standard_with_name(&index, "UserComment", TagValue::Undefined(b"hello".to_vec())).unwrap();

		let chain = root.collect();
		ifd_byte_encoder::encode_to_exif(&chain).unwrap()
	}

	#[test]
	fn
	round_trips_through_encode_and_decode()
	{
		let bytes = sample_chain_bytes();
		let chain = decode_chain(&bytes).unwrap();
		let flat  = chain.flatten();

		let processing_software = flat.iter().find(|e| e.tag == 0x000b).unwrap();
		assert_eq!(processing_software.value, TagValue::Ascii("test".to_string()));

		let user_comment = flat.iter().find(|e| e.tag == 0x9286).unwrap();
		assert_eq!(user_comment.value, TagValue::Undefined(b"hello".to_vec()));
	}

	#[test]
	fn
	update_existing_tag_preserves_others
	(
	)
	{
		let bytes = sample_chain_bytes();
		let chain = decode_chain(&bytes).unwrap();

		let mut builder = chain.into_builder();
		let index_mapping = new_mapping_with_standard();
		let index = new_tag_index(&index_mapping);
		let exif  = builder.get_or_create_ib_from_root_ib(IFD_EXIF);
		exif.set_standard_with_name(&index, "UserComment", TagValue::Undefined(b"updated".to_vec())).unwrap();

		let new_chain = builder.collect();
		let encoded   = ifd_byte_encoder::encode_to_exif(&new_chain).unwrap();
		let decoded   = decode_chain(&encoded).unwrap();
		let flat      = decoded.flatten();

		assert_eq!(flat.iter().find(|e| e.tag == 0x9286).unwrap().value, TagValue::Undefined(b"updated".to_vec()));
		assert_eq!(flat.iter().find(|e| e.tag == 0x000b).unwrap().value, TagValue::Ascii("test".to_string()));
	}
}
