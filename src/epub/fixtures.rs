//! 测试用EPUB归档
//!
//! 在内存中用 `ZipWriter` 构造归档。`jekyll_v2` / `jekyll_v3` 是同一本书的两种打包方式。

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::FileOptions;

pub const BOOK_TITLE: &str = "The Strange Case of Dr. Jekyll and Mr. Hyde";
pub const TITLE_PAGE: &str = "The Strange Case Of Dr. Jekyll And Mr. Hyde";
pub const LICENSE_TITLE: &str = "THE FULL PROJECT GUTENBERG LICENSE";

pub const CHAPTER_TITLES: [&str; 10] = [
    "STORY OF THE DOOR",
    "SEARCH FOR MR. HYDE",
    "DR. JEKYLL WAS QUITE AT EASE",
    "THE CAREW MURDER CASE",
    "INCIDENT OF THE LETTER",
    "INCIDENT OF DR. LANYON",
    "INCIDENT AT THE WINDOW",
    "THE LAST NIGHT",
    "DR. LANYON’S NARRATIVE",
    "HENRY JEKYLL’S FULL STATEMENT OF THE CASE",
];

/// 1x1 PNG
pub const DOOR_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

pub const COVER_JPG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46, 0x49, 0x46];

/// 把若干条目写成一个zip归档
pub fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(*name, FileOptions::<()>::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn container_xml(opf_path: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="{}" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#,
        opf_path
    )
}

fn xhtml(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title>{}</title>
<link href="../pgepub.css" rel="stylesheet" type="text/css"/>
<style type="text/css">.pgmonospaced {{ font-family: monospace; }}</style>
</head>
<body>
{}
</body>
</html>"#,
        title, body
    )
}

fn chapter_file(n: usize) -> String {
    format!("text/chapter{:02}.xhtml", n)
}

fn chapter_xhtml(n: usize, title: &str) -> String {
    let image = if n == 1 {
        r#"<div class="figcenter"><img src="../images/the%20door.png" alt="The door" class="x-ebookmaker"/></div>"#
    } else {
        ""
    };
    xhtml(
        title,
        &format!(
            r#"<div class="chapter" id="chap{n:02}">
<h2><a id="link2H_4_{n:04}"></a>{title}</h2>
{image}
<p>Mr. Utterson the lawyer was a man of a rugged countenance that was never lighted by a smile.</p>
</div>"#
        ),
    )
}

fn license_xhtml() -> String {
    xhtml(
        "License",
        &format!(
            "<div id=\"pg-footer\">\n<h2>{}</h2>\n<p>To protect the Project Gutenberg&#8482; mission.</p>\n</div>",
            LICENSE_TITLE
        ),
    )
}

fn common_entries(files: &mut Vec<(String, Vec<u8>)>) {
    files.push(("mimetype".to_string(), b"application/epub+zip".to_vec()));
    files.push((
        "META-INF/container.xml".to_string(),
        container_xml("OEBPS/content.opf").into_bytes(),
    ));
    files.push(("OEBPS/pgepub.css".to_string(), b"body { margin: 0 }".to_vec()));
    files.push(("OEBPS/images/cover.jpg".to_string(), COVER_JPG.to_vec()));
    files.push(("OEBPS/images/the door.png".to_string(), DOOR_PNG.to_vec()));
    files.push((
        "OEBPS/wrap0000.xhtml".to_string(),
        xhtml("Cover", r#"<div><img src="images/cover.jpg" alt="Cover"/></div>"#).into_bytes(),
    ));
    for (i, title) in CHAPTER_TITLES.iter().enumerate() {
        files.push((format!("OEBPS/{}", chapter_file(i + 1)), chapter_xhtml(i + 1, title).into_bytes()));
    }
    files.push(("OEBPS/text/license.xhtml".to_string(), license_xhtml().into_bytes()));
}

fn finish(files: Vec<(String, Vec<u8>)>) -> Vec<u8> {
    let entries: Vec<(&str, &[u8])> = files
        .iter()
        .map(|(name, data)| (name.as_str(), data.as_slice()))
        .collect();
    build_archive(&entries)
}

fn chapter_manifest_items() -> String {
    let mut items = String::new();
    for n in 1..=CHAPTER_TITLES.len() {
        items.push_str(&format!(
            "    <item href=\"{}\" id=\"item{}\" media-type=\"application/xhtml+xml\"/>\n",
            chapter_file(n),
            n + 4
        ));
    }
    items
}

fn chapter_itemrefs() -> String {
    (1..=CHAPTER_TITLES.len())
        .map(|n| format!("    <itemref idref=\"item{}\" linear=\"yes\"/>\n", n + 4))
        .collect()
}

/// EPUB2版本：NCX目录，标题页单独成章，许可证章节没有目录项
pub fn jekyll_v2() -> Vec<u8> {
    let mut files = Vec::new();
    common_entries(&mut files);

    let opf = format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<package xmlns:opf="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata>
    <dc:rights>Public domain in the USA.</dc:rights>
    <dc:identifier opf:scheme="URI" id="id">http://www.gutenberg.org/43</dc:identifier>
    <dc:creator opf:file-as="Stevenson, Robert Louis" opf:role="aut">Robert Louis Stevenson</dc:creator>
    <dc:title>{BOOK_TITLE}</dc:title>
    <dc:language xsi:type="dcterms:RFC4646" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">en</dc:language>
    <dc:subject>Science fiction</dc:subject>
    <dc:subject>London (England) -- Fiction</dc:subject>
    <dc:date opf:event="publication">2008-06-27</dc:date>
    <dc:date opf:event="conversion">2021-03-01T12:00:00.000000+00:00</dc:date>
    <dc:source>https://www.gutenberg.org/files/43/43-h/43-h.htm</dc:source>
    <meta name="cover" content="coverpage"/>
  </metadata>
  <manifest>
    <item href="images/cover.jpg" id="coverpage" media-type="image/jpeg"/>
    <item href="pgepub.css" id="item1" media-type="text/css"/>
    <item href="images/the%20door.png" id="item2" media-type="image/png"/>
    <item href="text/title.xhtml" id="item3" media-type="application/xhtml+xml"/>
    <item href="text/license.xhtml" id="item4" media-type="application/xhtml+xml"/>
{items}    <item href="toc.ncx" id="ncx" media-type="application/x-dtbncx+xml"/>
    <item href="wrap0000.xhtml" id="coverpage-wrapper" media-type="application/xhtml+xml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="coverpage-wrapper" linear="yes"/>
    <itemref idref="item3" linear="yes"/>
{itemrefs}    <itemref idref="item4" linear="yes"/>
  </spine>
  <guide>
    <reference type="cover" title="Cover" href="wrap0000.xhtml"/>
  </guide>
</package>"#,
        items = chapter_manifest_items(),
        itemrefs = chapter_itemrefs(),
    );

    let mut nav_points = String::new();
    for (i, title) in CHAPTER_TITLES.iter().enumerate() {
        let n = i + 1;
        nav_points.push_str(&format!(
            r#"      <navPoint id="np-{id}" playOrder="{id}">
        <navLabel><text>{title}</text></navLabel>
        <content src="{file}#link2H_4_{n:04}"/>
      </navPoint>
"#,
            id = n + 1,
            file = chapter_file(n),
        ));
    }
    let ncx = format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<!DOCTYPE ncx PUBLIC '-//NISO//DTD ncx 2005-1//EN' 'http://www.daisy.org/z3986/2005/ncx-2005-1.dtd'>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1" xml:lang="en">
  <head>
    <meta name="dtb:uid" content="http://www.gutenberg.org/43"/>
    <meta name="dtb:depth" content="2"/>
  </head>
  <docTitle><text>{BOOK_TITLE}</text></docTitle>
  <navMap>
    <navPoint id="np-1" playOrder="1">
      <navLabel><text>{TITLE_PAGE}</text></navLabel>
      <content src="text/title.xhtml#pgepubid00000"/>
{nav_points}    </navPoint>
    <navPoint id="np-12" playOrder="12">
      <navLabel><text>Chapter One Again</text></navLabel>
      <content src="text/chapter01.xhtml#later"/>
    </navPoint>
  </navMap>
</ncx>"#
    );

    files.push(("OEBPS/content.opf".to_string(), opf.into_bytes()));
    files.push(("OEBPS/toc.ncx".to_string(), ncx.into_bytes()));
    files.push((
        "OEBPS/text/title.xhtml".to_string(),
        xhtml(
            BOOK_TITLE,
            &format!("<h1 id=\"pgepubid00000\">{}</h1>\n<h2>by Robert Louis Stevenson</h2>", TITLE_PAGE),
        )
        .into_bytes(),
    ));
    finish(files)
}

/// EPUB3版本：导航文档目录(本身也在脊柱中，标题为Contents)，同时保留一个旧的NCX
pub fn jekyll_v3() -> Vec<u8> {
    let mut files = Vec::new();
    common_entries(&mut files);

    let opf = format!(
        r##"<?xml version='1.0' encoding='UTF-8'?>
<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/" version="3.0" unique-identifier="id" xml:lang="en" prefix="marc: http://id.loc.gov/vocabulary/">
  <metadata>
    <dc:identifier id="id">http://www.gutenberg.org/43</dc:identifier>
    <dc:title id="title">{BOOK_TITLE}</dc:title>
    <meta refines="#title" property="title-type">main</meta>
    <dc:language>en</dc:language>
    <dc:creator id="author_0">Robert Louis Stevenson</dc:creator>
    <meta refines="#author_0" property="role" scheme="marc:relators">aut</meta>
    <meta refines="#author_0" property="file-as">Stevenson, Robert Louis</meta>
    <dc:subject>Science fiction</dc:subject>
    <dc:date>2008-06-27</dc:date>
    <dc:rights>Public domain in the USA.</dc:rights>
    <meta property="dcterms:modified">2021-03-01T12:00:00Z</meta>
    <meta name="cover" content="coverpage"/>
  </metadata>
  <manifest>
    <item href="images/cover.jpg" id="coverpage" media-type="image/jpeg" properties="cover-image"/>
    <item href="pgepub.css" id="item1" media-type="text/css"/>
    <item href="images/the%20door.png" id="item2" media-type="image/png"/>
    <item href="text/license.xhtml" id="item4" media-type="application/xhtml+xml"/>
{items}    <item href="toc.ncx" id="ncx" media-type="application/x-dtbncx+xml"/>
    <item href="toc.xhtml" id="nav" media-type="application/xhtml+xml" properties="nav"/>
    <item href="wrap0000.xhtml" id="coverpage-wrapper" media-type="application/xhtml+xml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="coverpage-wrapper" linear="yes"/>
    <itemref idref="nav" linear="yes"/>
{itemrefs}    <itemref idref="item4" linear="yes"/>
  </spine>
</package>"##,
        items = chapter_manifest_items(),
        itemrefs = chapter_itemrefs(),
    );

    let mut links = String::from("      <li><a href=\"toc.xhtml\">Contents</a></li>\n");
    for (i, title) in CHAPTER_TITLES.iter().enumerate() {
        let n = i + 1;
        links.push_str(&format!(
            "      <li><a href=\"{}#link2H_4_{:04}\">{}</a></li>\n",
            chapter_file(n),
            n,
            title
        ));
    }
    links.push_str(&format!(
        "      <li><a href=\"text/license.xhtml\">{}</a></li>\n",
        LICENSE_TITLE
    ));
    let nav = format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="en">
<head><title>{BOOK_TITLE}</title></head>
<body>
  <nav epub:type="toc" id="toc">
    <h2>Contents</h2>
    <ol>
{links}    </ol>
  </nav>
  <nav epub:type="landmarks" hidden="hidden">
    <ol>
      <li><a href="wrap0000.xhtml" epub:type="cover">Cover</a></li>
      <li><a href="text/chapter01.xhtml" epub:type="bodymatter">Begin Reading</a></li>
    </ol>
  </nav>
</body>
</html>"#
    );

    // 旧NCX里的标题与导航文档不同，用来确认EPUB3没有读它
    let ncx = r#"<?xml version='1.0' encoding='UTF-8'?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <navMap>
    <navPoint id="np-1" playOrder="1">
      <navLabel><text>From The NCX</text></navLabel>
      <content src="text/chapter01.xhtml"/>
    </navPoint>
  </navMap>
</ncx>"#;

    files.push(("OEBPS/content.opf".to_string(), opf.into_bytes()));
    files.push(("OEBPS/toc.xhtml".to_string(), nav.into_bytes()));
    files.push(("OEBPS/toc.ncx".to_string(), ncx.as_bytes().to_vec()));
    finish(files)
}
