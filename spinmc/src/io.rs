//! Trace and snapshot output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use itertools::izip;

use crate::run::{SweepObserver, SweepReport};
use crate::state::{HeisenbergState, IsingState};

/// Observer writing one CSV row per recorded sample.
pub struct TraceWriter<W: Write> {
    writer: W,
}

impl TraceWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .wrap_err_with(|| format!("Unable to create trace file: {}", path.display()))?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> TraceWriter<W> {
    pub fn new(mut writer: W) -> Result<Self> {
        writeln!(writer, "sweep,energy,magnetization")?;
        Ok(Self { writer })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SweepObserver for TraceWriter<W> {
    fn sweep_finished(&mut self, report: &SweepReport) -> Result<()> {
        if report.sampled {
            writeln!(
                self.writer,
                "{},{:.12},{:.12}",
                report.sweep, report.energy, report.magnetization
            )?;
        }
        Ok(())
    }
}

/// Per-site dump of a final spin configuration.
pub trait SnapshotFormat {
    fn write_snapshot<W: Write>(&self, writer: &mut W) -> Result<()>;
}

impl SnapshotFormat for IsingState {
    fn write_snapshot<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "site,spin")?;
        for (site, &spin) in self.spins.iter().enumerate() {
            writeln!(writer, "{},{}", site, spin)?;
        }
        Ok(())
    }
}

impl SnapshotFormat for HeisenbergState {
    fn write_snapshot<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "site,x,y,z")?;
        for (site, (x, y, z)) in izip!(&self.x, &self.y, &self.z).enumerate() {
            writeln!(writer, "{},{:.12},{:.12},{:.12}", site, x, y, z)?;
        }
        Ok(())
    }
}

pub fn write_snapshot_file<S: SnapshotFormat>(path: &Path, state: &S) -> Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("Unable to create snapshot file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    state.write_snapshot(&mut writer)?;
    writer.flush()?;
    Ok(())
}
