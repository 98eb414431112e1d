use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-press",
    about = "Batch image compression from URLs, manifests, or raw bytes",
    long_about = "img-press fetches JPEG and PNG images by URL (or reads raw image bytes), \
                  re-encodes them at the requested quality, and stores the results. Batches \
                  and CSV/spreadsheet manifests are processed item by item: one bad entry \
                  never fails the rest. Results are printed as JSON or written to a CSV \
                  result manifest.",
    version,
    after_help = "EXAMPLES:\n  \
    img-press compress https://example.com/photo.jpg -q 70\n  \
    img-press batch https://example.com/a.png https://example.com/b.jpeg -o csv\n  \
    img-press manifest ./images.csv -q 85 --progress\n  \
    img-press raw ./photo.png -q 60\n  \
    img-press --config press.toml config"
)]
pub struct Args {
    #[arg(
        long,
        global = true,
        help = "Path to a TOML configuration file",
        long_help = "Configuration file with [compression] and [storage] sections. \
                     Built-in defaults are used when omitted."
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Only log warnings and errors")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress a single image URL",
        long_about = "Compress one http(s) image URL ending in .jpg, .jpeg or .png. \
                      Any failure is reported as an error."
    )]
    Compress {
        #[arg(help = "Image URL (http or https)")]
        url: String,

        #[arg(long, default_value_t = 1, help = "Image id reported in the result")]
        id: i64,

        #[arg(
            short = 'q',
            long,
            allow_negative_numbers = true,
            help = "Compression quality (0-100, default from config)",
            long_help = "Compression quality from 0 (smallest) to 100 (best). \
                         For PNG: >=90 uses Zopfli, >=70 uses high compression, \
                         <70 uses standard compression."
        )]
        quality: Option<i32>,

        #[arg(
            short = 'o',
            long,
            default_value = "inline",
            help = "Output mode (inline, csv)"
        )]
        output: String,
    },

    #[command(
        about = "Compress several image URLs",
        long_about = "Compress a list of image URLs. Ids are assigned 1..n in argument order. \
                      Failed items are reported alongside successful ones."
    )]
    Batch {
        #[arg(required = true, help = "Image URLs (http or https)")]
        urls: Vec<String>,

        #[arg(
            short = 'q',
            long,
            allow_negative_numbers = true,
            help = "Compression quality for every image (0-100)"
        )]
        quality: Option<i32>,

        #[arg(
            short = 'o',
            long,
            default_value = "inline",
            help = "Output mode (inline, csv)"
        )]
        output: String,

        #[arg(long, help = "Show a progress bar")]
        progress: bool,
    },

    #[command(
        about = "Compress every image listed in a manifest",
        long_about = "Read an `ImageId,ImageURL` manifest (.csv or .xls) and compress each entry. \
                      A malformed manifest fails as a whole."
    )]
    Manifest {
        #[arg(help = "Manifest file path (.csv or .xls)")]
        file: PathBuf,

        #[arg(
            short = 'q',
            long,
            allow_negative_numbers = true,
            help = "Compression quality for every image (0-100)"
        )]
        quality: Option<i32>,

        #[arg(
            short = 'o',
            long,
            default_value = "inline",
            help = "Output mode (inline, csv)"
        )]
        output: String,

        #[arg(long, help = "Show a progress bar")]
        progress: bool,
    },

    #[command(
        about = "Compress a local image file as raw bytes",
        long_about = "Read a PNG or JPEG file and compress its bytes. The format is detected \
                      from content, not from the file name."
    )]
    Raw {
        #[arg(help = "Image file path")]
        input: PathBuf,

        #[arg(
            short = 'q',
            long,
            allow_negative_numbers = true,
            help = "Compression quality (0-100)"
        )]
        quality: Option<i32>,

        #[arg(
            short = 'o',
            long,
            default_value = "inline",
            help = "Output mode (inline, csv)"
        )]
        output: String,
    },

    #[command(about = "Print the effective configuration as TOML")]
    Config,
}
