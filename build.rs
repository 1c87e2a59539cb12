use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Keep in sync with `STATIC_TASK_SIZE` in src/idle.rs. `setup()` rechecks
/// the kernel's size against the Rust constant at startup.
const RESERVED_STATIC_TASK_SIZE: usize = 128;

fn main() {
    // Put memory.x where the linker can find it.
    let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=csrc/kernel_config.c");
    println!("cargo:rerun-if-env-changed=FREERTOS_LIB_DIR");
    println!("cargo:rerun-if-env-changed=FREERTOS_INCLUDE_DIRS");

    if env::var_os("CARGO_FEATURE_FIRMWARE").is_none() {
        return;
    }
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");

    // Export the kernel's real settings and StaticTask_t size. Compiling
    // against the kernel headers also fails the build if StaticTask_t
    // outgrows the reserved storage.
    let includes = env::var_os("FREERTOS_INCLUDE_DIRS").expect(
        "FREERTOS_INCLUDE_DIRS must list the kernel include dir, its port dir \
         and the dir holding FreeRTOSConfig.h",
    );
    cc::Build::new()
        .file("csrc/kernel_config.c")
        .includes(env::split_paths(&includes))
        .define(
            "RESERVED_STATIC_TASK_SIZE",
            RESERVED_STATIC_TASK_SIZE.to_string().as_str(),
        )
        .compile("kernel_config");

    // The kernel itself is C, built separately as libfreertos.a.
    if let Some(dir) = env::var_os("FREERTOS_LIB_DIR") {
        println!("cargo:rustc-link-search={}", PathBuf::from(dir).display());
        println!("cargo:rustc-link-lib=static=freertos");
    }
}
