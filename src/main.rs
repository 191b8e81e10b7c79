use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use epub_parser::{Epub, ExtractedBook, ParseOptions};
use tracing_subscriber::EnvFilter;

/// 📚 epub-parser - EPUB元数据与正文提取工具
#[derive(Parser)]
#[command(name = "epub-parser")]
#[command(about = "提取EPUB 2/3文件的元数据、目录和自包含的章节HTML")]
#[command(version)]
struct Args {
    /// EPUB文件路径
    #[arg(help = "要处理的EPUB文件路径", required_unless_present = "dump_config")]
    epub_file: Option<PathBuf>,

    /// 详细输出模式
    #[arg(short, long, help = "显示详细信息并输出debug日志")]
    verbose: bool,

    /// 显示元数据信息
    #[arg(short, long, help = "显示完整的元数据列表")]
    metadata: bool,

    /// 显示目录映射
    #[arg(short, long, help = "显示目录中 路径 → 标题 的映射")]
    toc: bool,

    /// 显示章节列表
    #[arg(short, long, help = "列出全部章节及其大小")]
    sections: bool,

    /// 显示指定章节内容
    #[arg(short = 'c', long = "section", help = "输出指定章节的HTML（从1开始）")]
    section: Option<usize>,

    /// 导出封面
    #[arg(long, help = "把封面图片写到指定路径")]
    cover_out: Option<PathBuf>,

    /// 解析选项文件
    #[arg(long, help = "YAML格式的解析选项文件")]
    config: Option<PathBuf>,

    /// 输出默认解析选项
    #[arg(long, help = "打印默认解析选项(YAML)后退出")]
    dump_config: bool,

    /// 输出格式
    #[arg(long, value_enum, default_value = "text", help = "结果的输出格式")]
    format: OutputFormat,
}

/// 结果输出格式
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// 人类可读的文本
    Text,
    /// 完整结果的YAML
    Yaml,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("❌ 错误: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    if args.dump_config {
        print!("{}", ParseOptions::default_config().to_yaml()?);
        return Ok(());
    }

    let Some(path) = args.epub_file.as_ref() else {
        return Err("缺少EPUB文件路径".into());
    };

    let options = match &args.config {
        Some(config_path) => ParseOptions::from_file(config_path)?,
        None => ParseOptions::default_config(),
    };

    let mut epub = Epub::open(path)?;
    let book = epub.parse_with_options(&options)?;

    if let Some(cover_path) = &args.cover_out {
        write_cover(&book, cover_path)?;
    }

    if args.format == OutputFormat::Yaml {
        print!("{}", serde_yml::to_string(&book)?);
        return Ok(());
    }

    display_summary(&book, args.verbose);

    if args.metadata {
        display_metadata(&book);
    }

    if args.toc {
        println!("\n🧭 目录映射:");
        let toc = epub.toc_map()?;
        for (i, entry) in toc.iter().enumerate() {
            println!("  {}. {} → {}", i + 1, entry.path, entry.title);
        }
    }

    if args.sections {
        display_sections(&book, args.verbose);
    }

    if let Some(index) = args.section {
        let texts = book.result.texts();
        let content = index
            .checked_sub(1)
            .and_then(|i| texts.get(i))
            .ok_or_else(|| format!("章节索引 {} 超出范围 (共 {} 个章节)", index, texts.len()))?;
        println!("\n📖 第 {} 章: {}", index, content.title);
        println!("{}", content.html);
    }

    Ok(())
}

fn display_summary(book: &ExtractedBook, verbose: bool) {
    let metadata = book.result.metadata();
    println!("📚 {}", if metadata.title.is_empty() { "(无标题)" } else { metadata.title.as_str() });
    println!("  版本: {}", book.version);
    println!("  OPF文件: {}", book.rootfile);
    if !metadata.creator.is_empty() {
        println!("  作者: {}", metadata.creator);
    }
    if !metadata.language.is_empty() {
        println!("  语言: {}", metadata.language);
    }
    println!("  标识符: {}", metadata.identifier);
    println!("  章节: {} 个", book.result.texts().len());

    match &book.cover {
        Some(cover) => println!("  🖼️  封面: {} ({} 字节)", cover.path, cover.size()),
        None => println!("  🖼️  封面: 无"),
    }

    if verbose && !book.skipped.is_empty() {
        println!("\n⚠️  跳过的脊柱项:");
        for skipped in &book.skipped {
            println!("    {} ({:?})", skipped.idref, skipped.reason);
        }
    }
}

fn display_metadata(book: &ExtractedBook) {
    let metadata = &book.full_metadata;
    println!("\n📊 元数据:");

    println!("\n  📚 标题:");
    for title in &metadata.titles {
        let mut line = format!("    {}", title.text);
        if let Some(file_as) = &title.file_as {
            line.push_str(&format!(" [排序: {}]", file_as));
        }
        if let Some(title_type) = &title.title_type {
            line.push_str(&format!(" ({})", title_type));
        }
        println!("{}", line);
    }

    println!("\n  🔖 标识符:");
    for identifier in &metadata.identifiers {
        match &identifier.scheme {
            Some(scheme) => println!("    {}: {}", scheme, identifier.value),
            None => println!("    {}", identifier.value),
        }
    }

    for (label, people) in [("作者", &metadata.creators), ("贡献者", &metadata.contributors)] {
        if people.is_empty() {
            continue;
        }
        println!("\n  👥 {}:", label);
        for person in people {
            let mut line = format!("    {}", person.name);
            if !person.role.is_empty() {
                line.push_str(&format!(" ({})", person.role));
            }
            if let Some(file_as) = &person.file_as {
                line.push_str(&format!(" [排序: {}]", file_as));
            }
            println!("{}", line);
        }
    }

    let lists = [
        ("语言", &metadata.languages),
        ("出版社", &metadata.publishers),
        ("主题", &metadata.subjects),
        ("描述", &metadata.descriptions),
        ("版权", &metadata.rights),
    ];
    for (label, values) in lists {
        if values.is_empty() {
            continue;
        }
        println!("\n  {}:", label);
        for value in values {
            println!("    {}", value);
        }
    }

    if !metadata.dates.is_empty() {
        println!("\n  🕐 日期:");
        for date in &metadata.dates {
            match &date.event {
                Some(event) => println!("    {} ({})", date.text, event),
                None => println!("    {}", date.text),
            }
        }
    }

    if let Some(cover_id) = metadata.cover_id() {
        println!("\n  封面id: {}", cover_id);
    }
}

fn display_sections(book: &ExtractedBook, verbose: bool) {
    println!("\n📑 章节列表:");
    for (i, content) in book.result.texts().iter().enumerate() {
        if verbose {
            println!("  {}. {} ({} 字节)", i + 1, content.title, content.html.len());
        } else {
            println!("  {}. {}", i + 1, content.title);
        }
    }
}

fn write_cover(book: &ExtractedBook, path: &Path) -> Result<(), Box<dyn Error>> {
    let Some(cover) = &book.cover else {
        return Err("这本书没有封面".into());
    };
    fs::write(path, &cover.data)?;
    println!("🖼️  封面已写入: {} ({} 字节)", path.display(), cover.size());
    Ok(())
}
