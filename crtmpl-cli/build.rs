use std::fs::create_dir_all;

pub mod command {
    include!("src/command.rs");
}

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/command.rs");

    let out_dir = match std::env::var_os("ASSET_OUT_DIR") {
        Some(dir) => std::path::PathBuf::from(dir),
        None => return Ok(()),
    };

    let man = clap_mangen::Man::new(command::make_command());
    let mut man_buffer: Vec<u8> = Default::default();
    man.render(&mut man_buffer)?;

    let man_out_dir = out_dir.as_path().join("man");
    create_dir_all(&man_out_dir)?;
    std::fs::write(man_out_dir.join("crtmpl-cli.1"), man_buffer)?;

    Ok(())
}
