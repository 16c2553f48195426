fn main() -> anyhow::Result<()> {
    brrtnav::cli::run_cli()
}
