use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::msg_define::TickSample;

#[derive(Debug, Default)]
pub struct TraceRecorder {
    samples: Vec<TickSample>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: TickSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[TickSample] {
        &self.samples
    }

    pub fn write_json<P: AsRef<Path>>(&self, filepath: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(filepath)?);
        serde_json::to_writer_pretty(&mut writer, &self.samples)?;
        writer.flush()
    }
}
