use anyhow::Result;
use narrator::domain::narration::{NarrationError, NarrationService, NarrationSettings};
use narrator::infrastructure::audio::AudioAssembler;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub mod fakes;

use fakes::{ConcatMuxer, FakeTtsRepository};

pub struct TestContext {
    pub dir: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
    pub tts: Arc<FakeTtsRepository>,
    pub muxer: Arc<ConcatMuxer>,
}

impl TestContext {
    /// Write `document` to a fresh input file; output goes to `out/narration.<ext>`
    pub fn new(document: &str, extension: &str) -> Result<Self> {
        Self::with_fakes(
            document,
            extension,
            FakeTtsRepository::default(),
            ConcatMuxer::default(),
        )
    }

    pub fn with_fakes(
        document: &str,
        extension: &str,
        tts: FakeTtsRepository,
        muxer: ConcatMuxer,
    ) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.txt");
        std::fs::write(&input, document)?;
        let output = dir.path().join("out").join(format!("narration.{}", extension));

        Ok(Self {
            dir,
            input,
            output,
            tts: Arc::new(tts),
            muxer: Arc::new(muxer),
        })
    }

    pub fn service(&self, settings: NarrationSettings) -> Result<NarrationService, NarrationError> {
        NarrationService::new(
            settings,
            self.tts.clone(),
            AudioAssembler::new(self.muxer.clone()),
        )
    }
}
