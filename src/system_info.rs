use crate::config::Config;
use serde::Serialize;
use sysinfo::System;

#[derive(Serialize, Debug)]
pub struct SystemInfo {
    pub version: String,
    pub platform: String,
    pub arch: String,
    pub cpus: usize,
    pub memory_total_gb: f64,
    pub memory_free_gb: f64,
    pub ffmpeg: String,
}

pub fn get_system_info() -> SystemInfo {
    let mut system = System::new();
    system.refresh_memory();
    system.refresh_cpu();

    // Synchronous check; only used for the startup banner
    let ffmpeg_version = match std::process::Command::new("ffmpeg").arg("-version").output() {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("unknown")
            .to_string(),
        _ => "not available".to_string(),
    };

    SystemInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpus: system.cpus().len(),
        memory_total_gb: system.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0,
        memory_free_gb: system.free_memory() as f64 / 1024.0 / 1024.0 / 1024.0,
        ffmpeg: ffmpeg_version,
    }
}

pub fn print_startup_info(config: &Config) {
    println!("{}", "=".repeat(60));
    println!("🚀 Videoteca Starting...");
    println!("{}", "=".repeat(60));

    let sys_info = get_system_info();
    println!("📊 System Information:");
    println!("  Version: {}", sys_info.version);
    println!("  Platform: {} ({})", sys_info.platform, sys_info.arch);
    println!("  CPUs: {}", sys_info.cpus);
    println!(
        "  Memory: {:.2} GB total, {:.2} GB free",
        sys_info.memory_total_gb, sys_info.memory_free_gb
    );
    println!("  FFmpeg: {}", sys_info.ffmpeg);
    println!("  Blob API: {}", config.blob_api_url);
    println!("  Prefix: {:?}", config.prefix);
    println!(
        "  Token: {}",
        if config.blob_token.is_some() { "configured" } else { "missing" }
    );
    if let Some(dir) = &config.static_dir {
        println!("  Static Dir: {:?}", dir);
    }
    println!("{}", "=".repeat(60));
}
