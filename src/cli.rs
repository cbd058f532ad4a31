use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hexput-blockly",
    about = "Generate Hexput source from a saved block workspace (editor JSON format)."
)]
pub struct Args {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(value_name = "OUTPUT", help = "Write Hexput here instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(
        long = "literal",
        value_name = "TYPE:LABEL:VALUE",
        help = "Register a custom literal block before generating. Repeatable."
    )]
    pub literals: Vec<String>,

    #[arg(long, default_value_t = 2, help = "Spaces used to indent statement bodies.")]
    pub indent: usize,

    #[arg(long, help = "Write the block definitions JSON array to this path.")]
    pub emit_blocks: Option<PathBuf>,

    #[arg(long, help = "Write a default categorized toolbox XML to this path.")]
    pub emit_toolbox: Option<PathBuf>,
}
