use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Tab-indented JSON with one element per line. Every opening bracket is followed by a
/// line break, empty containers included, and floats carry exactly 8 fractional digits.
#[derive(Debug, Default)]
pub struct TabFormatter {
    depth: usize,
    has_value: bool,
}

impl TabFormatter {
    pub fn new() -> Self { Self::default() }
}

fn indent<W: ?Sized + Write>(writer: &mut W, depth: usize) -> io::Result<()> {
    for _ in 0..depth {
        writer.write_all(b"\t")?;
    }
    Ok(())
}

impl Formatter for TabFormatter {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(b"[\n")
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth -= 1;
        if self.has_value {
            writer.write_all(b"\n")?;
        }
        indent(writer, self.depth)?;
        writer.write_all(b"]")
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if !first {
            writer.write_all(b",\n")?;
        }
        indent(writer, self.depth)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(b"{\n")
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth -= 1;
        if self.has_value {
            writer.write_all(b"\n")?;
        }
        indent(writer, self.depth)?;
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if !first {
            writer.write_all(b",\n")?;
        }
        indent(writer, self.depth)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn write_f64<W: ?Sized + Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        write!(writer, "{value:.8}")
    }
}

pub fn write_pretty_to<W: Write, T: ?Sized + Serialize>(writer: W, value: &T) -> Result<()> {
    let mut ser = Serializer::with_formatter(writer, TabFormatter::new());
    value.serialize(&mut ser)?;
    Ok(())
}

pub fn to_pretty_string<T: ?Sized + Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    write_pretty_to(&mut buf, value)?;
    Ok(String::from_utf8(buf)?)
}

pub fn write_pretty<T: ?Sized + Serialize>(value: &T, path: &Path) -> Result<()> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(f);
    write_pretty_to(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
