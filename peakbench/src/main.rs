fn main() -> anyhow::Result<()> {
    peakbench::run()
}
