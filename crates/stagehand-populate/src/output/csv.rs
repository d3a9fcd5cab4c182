use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use stagehand_store::Entity;

/// Writes the entity index CSV: one row per stored entity, ordered by
/// entity type then id. Returns the number of bytes written.
pub fn write_entity_index(path: &Path, entities: &[Entity]) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::Writer::from_writer(counting);

    writer.write_record(["entity_type", "bundle", "id", "revision_id", "uuid", "label"])?;

    for entity in entities {
        let record = [
            entity.entity_type.clone(),
            entity.bundle.clone(),
            entity.id.map(|id| id.to_string()).unwrap_or_default(),
            entity
                .revision_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            entity.uuid.map(|uuid| uuid.to_string()).unwrap_or_default(),
            entity.label.clone().unwrap_or_default(),
        ];
        writer.write_record(&record)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
