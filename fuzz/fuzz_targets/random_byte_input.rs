#![no_main]

use libfuzzer_sys::fuzz_target;
use luminaire_lca::output::Output;
use luminaire_lca::{run_project, ProjectFlags, RunOptions};
use std::io;
use std::io::{BufReader, Cursor, Write};

fuzz_target!(|data: &[u8]| {
    let _run = run_project(
        BufReader::new(Cursor::new(data)),
        WritingSinkOutput,
        &RunOptions {
            flags: ProjectFlags::SENSITIVITY,
            ..Default::default()
        },
    );
});

/// Discards everything, but unlike `SinkOutput` does not let the writers be skipped.
#[derive(Debug, Default)]
pub struct WritingSinkOutput;

impl Output for WritingSinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        // report as writable so fuzzing also exercises the output writers
        false
    }
}
