//! numclass 命令行入口
//! 同时给出 --start 与 --end 时单次分析后退出，否则进入交互模式
//!
//! 运行命令：
//! cargo run -- --start 1 --end 10
//! cargo run -- --config-file my_rules.json

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use numclass::{ConfigManager, GlobalConfig, NumberAnalyzer};

#[derive(Parser)]
#[command(name = "numclass", version)]
#[command(about = "Analyze numbers based on rules from a configuration file.", long_about = None)]
struct Cli {
    /// The starting number of the range
    #[arg(long, allow_hyphen_values = true)]
    start: Option<String>,

    /// The ending number of the range
    #[arg(long, allow_hyphen_values = true)]
    end: Option<String>,

    /// The path to the configuration file (bare file names are looked up in the config directory)
    #[arg(long, alias = "config_file")]
    config_file: Option<PathBuf>,

    /// The configuration directory
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Treat unrecognized rules as errors instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Print only the labels, without the number prefix
    #[arg(long)]
    compact: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::custom()
        .config_dir(&cli.config_dir)
        .strict_rules(cli.strict)
        .verbose(cli.verbose)
        .build();

    // 日志输出到 stderr，不干扰结果输出；RUST_LOG 优先
    Builder::from_env(Env::default().default_filter_or(config.default_log_level()))
        .target(Target::Stderr)
        .init();

    let config_file = cli
        .config_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.default_config_file));

    match (&cli.start, &cli.end) {
        (Some(start), Some(end)) => {
            let analyzer = NumberAnalyzer::from_strs(start, end, &config_file, &config)?;
            analyzer
                .print_results(!cli.compact)
                .context("failed to write results")?;
            Ok(())
        }
        _ => run_interactive(&config, &config_file, !cli.compact),
    }
}

/// 交互模式：输入非法或分析失败时输出错误并重新提示，stdin 结束即退出
fn run_interactive(config: &GlobalConfig, config_file: &Path, debug: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(start) = prompt(&mut lines, "Please enter the starting number of the range: ")? else {
            return Ok(());
        };
        let Some(end) = prompt(&mut lines, "Please enter the ending number of the range: ")? else {
            return Ok(());
        };

        match NumberAnalyzer::from_strs(&start, &end, config_file, config) {
            Ok(analyzer) => analyzer
                .print_results(debug)
                .context("failed to write results")?,
            Err(e) => {
                eprintln!("Error: {}", e);
                continue;
            }
        }

        match prompt(&mut lines, "Continue? (y/n): ")? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {}
            _ => return Ok(()),
        }
    }
}

/// 输出提示并读取一行，None 表示输入结束
fn prompt<B: BufRead>(lines: &mut io::Lines<B>, message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush().context("failed to flush stdout")?;
    match lines.next() {
        Some(line) => Ok(Some(line.context("failed to read from stdin")?)),
        None => Ok(None),
    }
}
