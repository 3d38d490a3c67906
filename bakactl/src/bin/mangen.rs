use std::io::Result;
use std::path::{Path, PathBuf};
use std::{env, fs};

use bakactl::cli::Cli;
use clap::{Command, CommandFactory};
use clap_mangen::Man;

fn main() -> Result<()> {
    // Output directory: first argument, else OUT_DIR, else the current one
    let out_dir = env::args_os()
        .nth(1)
        .or_else(|| env::var_os("OUT_DIR"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    fs::create_dir_all(&out_dir)?;
    let root_cmd = Cli::command();
    generate_manpages(&root_cmd, &out_dir, &[])?;
    Ok(())
}

fn generate_manpages(cmd: &Command, out_dir: &Path, parent_cmds: &[String]) -> Result<()> {
    let mut cmd_path = parent_cmds.to_owned();
    cmd_path.push(cmd.get_name().to_string());

    // e.g. "bakactl-upload-files.1"
    let filename = format!("{}.1", cmd_path.join("-"));
    let out_path = out_dir.join(filename);

    let man = Man::new(cmd.clone());
    let mut buffer = Vec::<u8>::new();
    man.render(&mut buffer)?;
    fs::write(&out_path, buffer)?;
    println!("Man page generated at {}", out_path.display());

    for sub in cmd.get_subcommands() {
        generate_manpages(sub, out_dir, &cmd_path)?;
    }
    Ok(())
}
