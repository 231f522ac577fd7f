use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;

/// Destination of a JSON document: a file, or stdout when no path is given.
pub struct JsonOutput {
    writer: Box<dyn Write>,
    name: String,
}

impl JsonOutput {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                writer: Box::new(io::stdout().lock()),
                name: "stdout".to_owned(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            name: path.display().to_string(),
        })
    }

    /// Writes `value` as pretty-printed JSON followed by a newline.
    pub fn write<T>(mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.name))?;
        writeln!(self.writer)
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to flush output to {}", self.name))?;
        Ok(())
    }
}

pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    JsonOutput::create(path)?.write(value)
}

/// Reads a JSON file, naming `file_kind` in error messages.
pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}
