use nes_scanline::debug_flags;
use nes_scanline::{BankedMemory, Cartridge, MemoryMap, Movie};
use std::path::PathBuf;
use std::process;

// Cartridge / movie inspection tool
// Usage:
//   nes-inspect --rom roms/nestest.nes [--dump 0xC000 --len 0x40]
//   nes-inspect --movie movies/run.fm2 --frames 30

struct Args {
    rom: Option<PathBuf>,
    movie: Option<PathBuf>,
    frames: usize,
    dump_start: Option<u16>,
    dump_len: u16,
}

fn parse_u16_hex_or_dec(s: &str) -> Option<u16> {
    let s = s.trim();
    if let Some(stripped) = s.strip_prefix("0x").or_else(|| s.strip_prefix('$')) {
        u16::from_str_radix(stripped, 16).ok()
    } else {
        s.parse().ok()
    }
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        rom: None,
        movie: None,
        frames: 20,
        dump_start: None,
        dump_len: 0x40,
    };

    while let Some(a) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{} needs a value", a));
        match a.as_str() {
            "--rom" => parsed.rom = Some(PathBuf::from(value()?)),
            "--movie" => parsed.movie = Some(PathBuf::from(value()?)),
            "--frames" => {
                let v = value()?;
                parsed.frames = v
                    .parse()
                    .map_err(|_| format!("invalid frame count: {}", v))?;
            }
            "--dump" => {
                let v = value()?;
                parsed.dump_start =
                    Some(parse_u16_hex_or_dec(&v).ok_or_else(|| format!("invalid address: {}", v))?);
            }
            "--len" | "--length" => {
                let v = value()?;
                parsed.dump_len =
                    parse_u16_hex_or_dec(&v).ok_or_else(|| format!("invalid length: {}", v))?;
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }

    if parsed.rom.is_none() && parsed.movie.is_none() {
        return Err("nothing to inspect: pass --rom and/or --movie".to_string());
    }
    if parsed.dump_start.is_some() && parsed.rom.is_none() {
        return Err("--dump needs --rom".to_string());
    }
    Ok(parsed)
}

fn dump_memory(memory: &mut BankedMemory, start: u16, len: u16) {
    let end = start as u32 + len as u32;
    let mut addr = start as u32;
    while addr < end {
        let line_end = (addr + 16).min(end);
        print!("{:04X}:", addr);
        for a in addr..line_end {
            match memory.read_byte(a as u16) {
                Ok(b) => print!(" {:02X}", b),
                Err(_) => print!(" --"),
            }
        }
        println!();
        addr = line_end;
    }
}

fn inspect_rom(path: &PathBuf, dump: Option<(u16, u16)>) -> Result<(), String> {
    let cartridge = Cartridge::load(path).map_err(|e| e.to_string())?;
    if !debug_flags::quiet() {
        println!("== {} ==", path.display());
    }
    println!("{}", cartridge.header());

    if let Some((start, len)) = dump {
        let mut memory = BankedMemory::nrom(&cartridge).map_err(|e| e.to_string())?;
        dump_memory(&mut memory, start, len);
    }
    Ok(())
}

fn inspect_movie(path: &PathBuf, frames: usize) -> Result<(), String> {
    let movie = Movie::load(path).map_err(|e| e.to_string())?;
    if !debug_flags::quiet() {
        println!("== {} ({} frames) ==", path.display(), movie.len());
    }
    for (index, frame) in movie.frames().iter().take(frames).enumerate() {
        println!("{:6} {}", index, frame.buttons.to_movie_columns());
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("usage: nes-inspect [--rom PATH [--dump ADDR --len N]] [--movie PATH [--frames N]]");
            process::exit(2);
        }
    };

    if let Some(rom) = &args.rom {
        let dump = args.dump_start.map(|start| (start, args.dump_len));
        if let Err(msg) = inspect_rom(rom, dump) {
            eprintln!("failed to load ROM {}: {}", rom.display(), msg);
            process::exit(1);
        }
    }
    if let Some(movie) = &args.movie {
        if let Err(msg) = inspect_movie(movie, args.frames) {
            eprintln!("failed to load movie {}: {}", movie.display(), msg);
            process::exit(1);
        }
    }
}
