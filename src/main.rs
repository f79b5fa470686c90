fn main() {
    #[cfg(feature = "cli")]
    oxideflate::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxideflate: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
