// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! TIFF `RATIONAL`/`SRATIONAL` value support: a pair of 32-bit integers
//! interpreted as numerator/denominator.

use crate::endian::Endian;

/// An unsigned TIFF `RATIONAL` (two u32, numerator over denominator).
pub type R64u = (u32, u32);

/// A signed TIFF `SRATIONAL` (two i32, numerator over denominator).
pub type R64i = (i32, i32);

pub fn
r64u_to_bytes
(
	value:  &R64u,
	endian: &Endian,
)
-> Vec<u8>
{
	let mut out = Vec::with_capacity(8);
	out.extend(int_to_bytes(value.0, endian));
	out.extend(int_to_bytes(value.1, endian));
	out
}

pub fn
r64i_to_bytes
(
	value:  &R64i,
	endian: &Endian,
)
-> Vec<u8>
{
	let mut out = Vec::with_capacity(8);
	out.extend(int_to_bytes(value.0 as u32, endian));
	out.extend(int_to_bytes(value.1 as u32, endian));
	out
}

pub fn
r64u_from_bytes
(
	bytes:  &[u8],
	endian: &Endian,
)
-> Option<R64u>
{
	if bytes.len() != 8
	{
		return None;
	}

	Some((
		bytes_to_u32(&bytes[0..4], endian),
		bytes_to_u32(&bytes[4..8], endian),
	))
}

pub fn
r64i_from_bytes
(
	bytes:  &[u8],
	endian: &Endian,
)
-> Option<R64i>
{
	if bytes.len() != 8
	{
		return None;
	}

	Some((
		bytes_to_u32(&bytes[0..4], endian) as i32,
		bytes_to_u32(&bytes[4..8], endian) as i32,
	))
}

fn
int_to_bytes
(
	value:  u32,
	endian: &Endian,
)
-> [u8; 4]
{
	match *endian
	{
		Endian::Little => value.to_le_bytes(),
		Endian::Big    => value.to_be_bytes(),
	}
}

fn
bytes_to_u32
(
	bytes:  &[u8],
	endian: &Endian,
)
-> u32
{
	let array: [u8; 4] = bytes.try_into().expect("slice of length 4");

	match *endian
	{
		Endian::Little => u32::from_le_bytes(array),
		Endian::Big    => u32::from_be_bytes(array),
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn
	round_trip_unsigned()
	{
		let value: R64u = (1, 3);
		let bytes = r64u_to_bytes(&value, &Endian::Big);
		assert_eq!(r64u_from_bytes(&bytes, &Endian::Big), Some(value));
	}

	#[test]
	fn
	round_trip_signed_little_endian()
	{
		let value: R64i = (-5, 2);
		let bytes = r64i_to_bytes(&value, &Endian::Little);
		assert_eq!(r64i_from_bytes(&bytes, &Endian::Little), Some(value));
	}
}
