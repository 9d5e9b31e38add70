fn main() -> anyhow::Result<()> {
    personabalance_lib::run()
}
