use crate::config::AlignConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::DefaultNormalizer;
use crate::pipeline::runtime::{ReadAlongPipeline, ReadAlongPipelineParts};
use crate::pipeline::traits::{Aligner, TextNormalizer};

pub struct ReadAlongBuilder {
    config: AlignConfig,
    aligner: Option<Box<dyn Aligner>>,
    normalizer: Option<Box<dyn TextNormalizer>>,
}

impl ReadAlongBuilder {
    pub fn new(config: AlignConfig) -> Self {
        Self {
            config,
            aligner: None,
            normalizer: None,
        }
    }

    pub fn with_aligner(mut self, aligner: Box<dyn Aligner>) -> Self {
        self.aligner = Some(aligner);
        self
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn TextNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn build(self) -> Result<ReadAlongPipeline, AlignmentError> {
        self.config.validate()?;
        let aligner = self
            .aligner
            .ok_or_else(|| AlignmentError::config("no aligner configured"))?;

        Ok(ReadAlongPipeline::from_parts(ReadAlongPipelineParts {
            config: self.config,
            aligner,
            normalizer: self
                .normalizer
                .unwrap_or_else(|| Box::new(DefaultNormalizer)),
        }))
    }
}
