// Copyright © 2024 Tobias J. Prisching <tobias.prisching@icloud.com> and CONTRIBUTORS
// See https://github.com/TechnikTobi/little_exif#license for licensing details

//! `jpeg-dump`: prints the segment structure of a JPEG file, mirroring the
//! reference `js_dump` CLI informatively (spec §6). Argument parsing is
//! hand-rolled rather than pulled in from a crate, since CLI argument
//! parsing is an explicit non-goal of the library this binary demonstrates.

use std::io::Read;
use std::process::ExitCode;

use jpeg_segments::media_parser::JpegMediaParser;
use jpeg_segments::media_parser::MediaParser;
use jpeg_segments::Error;

struct
Args
{
	filepath:        Option<String>,
	json_list:       bool,
	json_object:     bool,
	data:            bool,
	verbose:         bool,
	just_xmp:        bool,
	just_full_iptc:  bool,
	just_simple_iptc: bool,
}

fn
parse_args
(
)
-> Result<Args, ()>
{
	let mut args = Args
	{
		filepath:         None,
		json_list:        false,
		json_object:      false,
		data:             false,
		verbose:          false,
		just_xmp:         false,
		just_full_iptc:   false,
		just_simple_iptc: false,
	};

	let mut iter = std::env::args().skip(1);
	while let Some(flag) = iter.next()
	{
		match flag.as_str()
		{
			"-f" | "--filepath"       => args.filepath = Some(iter.next().ok_or(())?),
			"-l" | "--json-list"      => args.json_list = true,
			"-o" | "--json-object"    => args.json_object = true,
			"-d" | "--data"           => args.data = true,
			"-v" | "--verbose"        => args.verbose = true,
			"-x" | "--just-xmp"       => args.just_xmp = true,
			"-i" | "--just-full-iptc" => args.just_full_iptc = true,
			"-s" | "--just-simple-iptc" => args.just_simple_iptc = true,
			_ => return Err(()),
		}
	}

	Ok(args)
}

fn
read_input
(
	args: &Args
)
-> std::io::Result<Vec<u8>>
{
	let mut bytes = Vec::new();

	match args.filepath.as_deref()
	{
		Some("-") | None => std::io::stdin().read_to_end(&mut bytes)?,
		Some(path)       => std::fs::File::open(path)?.read_to_end(&mut bytes)?,
	};

	Ok(bytes)
}

fn
run
(
)
-> ExitCode
{
	let args = match parse_args()
	{
		Ok(args) => args,
		Err(())  => { eprintln!("usage: jpeg-dump -f <path|-> [-l|-o] [-d] [-v] [-x] [-i|-s]"); return ExitCode::from(1); },
	};

	if args.just_full_iptc && args.just_simple_iptc
	{
		eprintln!("conflicting flags: --just-full-iptc and --just-simple-iptc");
		return ExitCode::from(2);
	}

	let bytes = match read_input(&args)
	{
		Ok(bytes) => bytes,
		Err(e)    => { eprintln!("could not read input: {e}"); return ExitCode::from(1); },
	};

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

	if args.just_xmp
	{
		return match segments.find_xmp()
		{
			Some(segment) => { println!("{}", segment.formatted_xmp().unwrap_or_default()); ExitCode::SUCCESS },
			None          => { eprintln!("no XMP data found"); ExitCode::from(10) },
		};
	}

	if args.just_full_iptc || args.just_simple_iptc
	{
		let segment = match segments.find_iptc()
		{
			Some(segment) => segment,
			None          => { eprintln!("no IPTC data found"); return ExitCode::from(10); },
		};

		if args.just_full_iptc
		{
			for (name, value) in segment.iptc_full().unwrap_or_default()
			{
				println!("{name} = {value}");
			}
		}
		else
		{
			for (name, value) in segment.iptc_simple().unwrap_or_default()
			{
				println!("{name} = {value}");
			}
		}

		return ExitCode::SUCCESS;
	}

	if args.json_list || args.json_object
	{
		print_json(&segments, args.json_list);
		return ExitCode::SUCCESS;
	}

	for segment in segments.iter()
	{
		if args.verbose || args.data
		{
			println!("{}", segment.embedded_string());
		}
		else
		{
			println!("{:>10} {}", segment.offset(), segment.marker_name());
		}
	}

	ExitCode::SUCCESS
}

fn
print_json
(
	segments:  &jpeg_segments::SegmentList,
	as_list:   bool,
)
{
	let entries: Vec<String> = segments.iter()
		.map(|s| format!(r#"{{"offset":{},"marker":"{}","length":{}}}"#, s.offset(), s.marker_name(), s.data().len()))
		.collect();

	if as_list
	{
		println!("[{}]", entries.join(","));
	}
	else
	{
		println!(r#"{{"segments":[{}]}}"#, entries.join(","));
	}
}

fn
main
(
)
-> ExitCode
{
	run()
}
