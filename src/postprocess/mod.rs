mod null_sink;
mod overwrite;
mod trim;

use anyhow::Result;

pub use null_sink::StripNullSinkStage;
pub use overwrite::OverwriteFlagStage;
pub use trim::TrimStage;

/// One rewrite applied to a command before it is handed back as final.
pub trait CommandPostProcessor: Send + Sync {
    fn process(&self, tool: &str, command: String) -> Result<String>;
}

pub struct PostProcessPipeline {
    stages: Vec<Box<dyn CommandPostProcessor>>,
}

impl PostProcessPipeline {
    pub fn new(stages: Vec<Box<dyn CommandPostProcessor>>) -> Self {
        Self { stages }
    }

    pub fn with_default_stages() -> Self {
        Self::new(vec![
            Box::new(TrimStage),
            Box::new(StripNullSinkStage),
            Box::new(OverwriteFlagStage),
        ])
    }
}

impl CommandPostProcessor for PostProcessPipeline {
    fn process(&self, tool: &str, mut command: String) -> Result<String> {
        for stage in &self.stages {
            command = stage.process(tool, command)?;
        }
        Ok(command)
    }
}

pub fn default_post_processor() -> Box<dyn CommandPostProcessor> {
    Box::new(PostProcessPipeline::with_default_stages())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipeline_produces_final_command() {
        let processor = default_post_processor();
        let command = processor
            .process(
                "ffmpeg",
                "  ffmpeg -i in.mp4 \\\n  -c:v libx264 -f null -  ".to_string(),
            )
            .unwrap();
        assert_eq!(command, "ffmpeg -y -i in.mp4 -c:v libx264");
    }

    #[test]
    fn stages_run_in_order() {
        struct Append(&'static str);

        impl CommandPostProcessor for Append {
            fn process(&self, _tool: &str, command: String) -> Result<String> {
                Ok(format!("{command}{}", self.0))
            }
        }

        let pipeline =
            PostProcessPipeline::new(vec![Box::new(Append("a")), Box::new(Append("b"))]);
        assert_eq!(pipeline.process("ffmpeg", String::new()).unwrap(), "ab");
    }
}
