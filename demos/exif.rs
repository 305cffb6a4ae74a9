// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! `jpeg-exif`: prints the flattened Exif tag tree of a JPEG file,
//! mirroring the reference `js_exif` CLI informatively (spec §6).

use std::io::Read;
use std::process::ExitCode;

use jpeg_segments::media_parser::JpegMediaParser;
use jpeg_segments::media_parser::MediaParser;
use jpeg_segments::Error;

struct
Args
{
	filepath: Option<String>,
	json:     bool,
	verbose:  bool,
}

fn
parse_args
(
)
-> Result<Args, ()>
{
	let mut args = Args { filepath: None, json: false, verbose: false };

	let mut iter = std::env::args().skip(1);
	while let Some(flag) = iter.next()
	{
		match flag.as_str()
		{
			"-f" | "--filepath" => args.filepath = Some(iter.next().ok_or(())?),
			"-j" | "--json"     => args.json = true,
			"-v" | "--verbose"  => args.verbose = true,
			_ => return Err(()),
		}
	}

	Ok(args)
}

fn
main
(
)
-> ExitCode
{
	let args = match parse_args()
	{
		Ok(args) => args,
		Err(())  => { eprintln!("usage: jpeg-exif -f <path|-> [-j] [-v]"); return ExitCode::from(1); },
	};

	let mut bytes = Vec::new();
	let read_result = match args.filepath.as_deref()
	{
		Some("-") | None => std::io::stdin().read_to_end(&mut bytes),
		Some(path)       => std::fs::File::open(path).and_then(|mut f| f.read_to_end(&mut bytes)),
	};

	if let Err(e) = read_result
	{
		eprintln!("could not read input: {e}");
		return ExitCode::from(1);
	}

	let parser = JpegMediaParser;
	let segments = match parser.parse_bytes(&bytes)
	{
		Ok(segments) => segments,
		Err(Error::StoppedEarly { partial }) =>
		{
			eprintln!("JPEG Segments (incomplete due to error)");
			partial
		},
		Err(e) => { eprintln!("{e}"); return ExitCode::from(1); },
	};

	let exif = match segments.find_exif()
	{
		Some(exif) => exif,
		None       => { eprintln!("no EXIF data found"); return ExitCode::from(10); },
	};

	let flat = match exif.exif_flat()
	{
		Ok(flat) => flat,
		Err(e)   => { eprintln!("{e}"); return ExitCode::from(1); },
	};

	if args.json
	{
		let entries: Vec<String> = flat.iter()
			.map(|e| format!(r#"{{"path":"{}","tag":"0x{:04x}","value":"{:?}"}}"#, e.path, e.tag, e.value))
			.collect();
		println!("[{}]", entries.join(","));
		return ExitCode::SUCCESS;
	}

	for entry in &flat
	{
		if args.verbose
		{
			println!("{}/0x{:04x} = {:?}", entry.path, entry.tag, entry.value);
		}
		else
		{
			println!("0x{:04x} = {:?}", entry.tag, entry.value);
		}
	}

	ExitCode::SUCCESS
}
