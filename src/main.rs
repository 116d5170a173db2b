fn main() -> anyhow::Result<()> {
    stayhard_lib::run()
}
