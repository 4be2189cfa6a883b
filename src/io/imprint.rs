use crate::utils::Timer;
use chrono::Local;
use clap::{crate_name, crate_version};
use log::warn;

const LOG_WIDTH: usize = 80;
const BOX_WIDTH: usize = 56;

fn centered(text: &str) {
    warn!("{: ^LOG_WIDTH$}", text);
}

fn boxed(lines: &[&str]) {
    centered(&":".repeat(BOX_WIDTH));
    for line in lines {
        centered(&format!("::{: ^w$}::", line, w = BOX_WIDTH - 4));
    }
    centered(&":".repeat(BOX_WIDTH));
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn write_header() {
    let name: String = crate_name!().to_uppercase();
    centered(&"=".repeat(name.len() + 8));
    centered(&name);
    centered(&"=".repeat(name.len() + 8));
    centered(&format!("version {}", crate_version!()));
    centered("");
    boxed(&[
        "Ehrenfest dynamics of trajectory ensembles",
        "diabatic and adiabatic representation",
    ]);
    centered(&format!("run started {}", timestamp()));
    centered("");
}

pub fn write_footer(timer: Timer) {
    warn!("{}", timer);
    centered(&format!("run finished {}", timestamp()));
    centered("");
    let closing: String = format!("{} terminated normally", crate_name!().to_uppercase());
    boxed(&[closing.as_str()]);
    centered("");
}
