// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! Serializes an [`IfdChain`](super::IfdChain) into the bytes that follow
//! the `Exif\0\0` prefix of an APP1 segment. Grounded in
//! `examples/TechnikTobi-little_exif/src/metadata.rs`'s `encode_ifd`, but
//! written as a single forward pass: each IFD's header is written with
//! zeroed placeholder offsets, then its overflow data and SubIFDs are
//! appended and the placeholders patched in afterwards, since by that point
//! their offsets are simply "where we are now" in the output buffer.

use log::debug;

use super::Ifd;
use super::IfdChain;
use super::IfdError;
use crate::endian::Endian;

/// Encodes `chain` into a full TIFF blob: the 8-byte header followed by
/// IFD0 (and any SubIFDs/chained IFDs it references).
pub fn
encode_to_exif
(
	chain: &IfdChain
)
-> Result<Vec<u8>, IfdError>
{
	debug!("encoding IFD chain to Exif bytes (endian={:?})", chain.endian);

	let mut out = chain.endian.header().to_vec();

	let first_ifd_offset_index = out.len();
	out.extend_from_slice(&[0, 0, 0, 0]);

	let root_offset = write_ifd(&mut out, &chain.root, chain.endian)?;
	patch_u32(&mut out, first_ifd_offset_index, root_offset, chain.endian);

	Ok(out)
}

fn
patch_u32
(
	out:    &mut [u8],
	index:  usize,
	value:  u32,
	endian: Endian,
)
{
	let bytes = match endian { Endian::Big => value.to_be_bytes(), Endian::Little => value.to_le_bytes() };
	out[index..index + 4].copy_from_slice(&bytes);
}

fn
write_u16
(
	out:    &mut Vec<u8>,
	value:  u16,
	endian: Endian,
)
{
	out.extend_from_slice(&match endian { Endian::Big => value.to_be_bytes(), Endian::Little => value.to_le_bytes() });
}

fn
write_u32
(
	out:    &mut Vec<u8>,
	value:  u32,
	endian: Endian,
)
{
	out.extend_from_slice(&match endian { Endian::Big => value.to_be_bytes(), Endian::Little => value.to_le_bytes() });
}

/// Writes one IFD node (its entries, then its overflow data, then its
/// SubIFDs, then its `next` chain link) into `out`, returning the absolute
/// offset at which this node's header begins.
fn
write_ifd
(
	out:    &mut Vec<u8>,
	ifd:    &Ifd,
	endian: Endian,
)
-> Result<u32, IfdError>
{
	if ifd.entries.len() > u16::MAX as usize
	{
		return Err(IfdError::Malformed("too many entries for one IFD"));
	}

	let header_offset = out.len() as u32;

	let mut entries = ifd.entries.clone();
	entries.sort_by_key(|e| e.tag);

	write_u16(out, entries.len() as u16, endian);

	let mut overflow_patches: Vec<(usize, Vec<u8>)> = Vec::new();

	for entry in &entries
	{
		write_u16(out, entry.tag, endian);
		write_u16(out, entry.value.format_code(), endian);
		write_u32(out, entry.value.component_count(), endian);

		let bytes = entry.value.encode_bytes(endian);
		let value_field_index = out.len();

		if bytes.len() <= 4
		{
			let mut padded = bytes;
			padded.resize(4, 0);
			out.extend_from_slice(&padded);
		}
		else
		{
			out.extend_from_slice(&[0, 0, 0, 0]);
			overflow_patches.push((value_field_index, bytes));
		}
	}

	let next_ptr_index = out.len();
	write_u32(out, 0, endian);

	for (patch_index, bytes) in overflow_patches
	{
		let offset = out.len() as u32;
		out.extend_from_slice(&bytes);
		if bytes_len_is_odd(&out)
		{
			out.push(0);
		}
		patch_u32(out, patch_index, offset, endian);
	}

	let mut child_patches: Vec<(usize, u32)> = Vec::new();
	for (tag, child) in &ifd.children
	{
		let child_offset = write_ifd(out, child, endian)?;

		// Find this tag's 12-byte entry within the just-written header to
		// patch its value field. Entries were written in sorted order
		// starting right after the 2-byte count.
		let entry_index = entries.iter().position(|e| e.tag == *tag)
			.ok_or(IfdError::Malformed("SubIFD tag missing from entry table"))?;
		let entry_base  = header_offset as usize + 2 + entry_index * 12;
		child_patches.push((entry_base + 8, child_offset));
	}

	for (patch_index, child_offset) in child_patches
	{
		patch_u32(out, patch_index, child_offset, endian);
	}

	if let Some(next) = &ifd.next
	{
		let next_offset = write_ifd(out, next, endian)?;
		patch_u32(out, next_ptr_index, next_offset, endian);
	}

	Ok(header_offset)
}

fn
bytes_len_is_odd
(
	out: &[u8]
)
-> bool
{
	out.len() % 2 == 1
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::ifd::new_ifd_builder;
	use crate::ifd::new_mapping_with_standard;
	use crate::ifd::new_tag_index;
	use crate::ifd::TagValue;
	use crate::ifd::IFD_STANDARD;

	#[test]
	fn
	header_matches_chosen_endian()
	{
		let mapping = new_mapping_with_standard();
		let index   = new_tag_index(&mapping);
		let mut root = new_ifd_builder(IFD_STANDARD);
		root.set_standard_with_name(&index, "ProcessingSoftware", TagValue::Ascii("x".to_string())).unwrap();

		let chain = root.collect();
		let bytes = encode_to_exif(&chain).unwrap();

		assert_eq!(Endian::from_header_bytes(&bytes[0..2]), Some(chain.endian));
	}
}
