//! Build command implementations (build and the single-stage tasks)

use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::build::{BuildContext, Pipeline, Stage, StageRunner};

/// Run a single stage.
pub fn run_stage(context: BuildContext, stage: Stage) -> ExitCode {
    let verbose = context.is_verbose();
    let runner = StageRunner::new(context);

    match runner.run(stage) {
        Ok(result) => {
            println!(
                "Finished '{}': {} file{} in {:?}",
                stage,
                result.outputs.len(),
                if result.outputs.len() == 1 { "" } else { "s" },
                result.duration
            );
            if verbose {
                for output in &result.outputs {
                    println!("  {}", output.display());
                }
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: '{}' failed: {}", stage, e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run the full build pipeline.
pub fn run_build(context: BuildContext, dry_run: bool) -> ExitCode {
    if dry_run {
        println!("Dry run - would build:");
        println!("  Source: {}", context.src_dir().display());
        println!("  Output: {}", context.out_dir().display());

        let pipeline = Pipeline::from_context(context).with_dry_run(true);
        println!("  Stages:");
        for (i, stage) in pipeline.stages().iter().enumerate() {
            println!("    {}. {}", i + 1, stage);
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    let verbose = context.is_verbose();
    match Pipeline::from_context(context).run() {
        Ok(result) => {
            println!("{}", result.summary());
            if verbose {
                for output in result.all_outputs() {
                    println!("  {}", output.display());
                }
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            println!("{}", e.result.summary());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn code(c: ExitCode) -> String {
        format!("{:?}", c)
    }

    #[test]
    fn test_build_exit_codes() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "app/index.html", "<p>hi</p>");
        write(temp.path(), "app/js/main.js", "var a = 1\n");

        let context = BuildContext::new(default_config(), temp.path().to_path_buf());
        assert_eq!(code(run_build(context, false)), code(ExitCode::from(EXIT_SUCCESS)));

        let mut config = default_config();
        config.paths.js.out = PathBuf::from("index.html/js");
        let context = BuildContext::new(config, temp.path().to_path_buf());
        assert_eq!(code(run_build(context, false)), code(ExitCode::from(EXIT_ERROR)));
        assert!(temp.path().join("build/index.html").is_file());
    }

    #[test]
    fn test_single_stage_write_failure_exits_with_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "app/js/main.js", "var a = 1\n");
        write(temp.path(), "build/blocked", "not a directory");

        let mut config = default_config();
        config.paths.js.out = PathBuf::from("blocked");
        let context = BuildContext::new(config, temp.path().to_path_buf());
        assert_eq!(code(run_stage(context, Stage::Js)), code(ExitCode::from(EXIT_ERROR)));
    }
}
