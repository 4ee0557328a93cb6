use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Color as CtColor, Stylize};
use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Color Palette - Reading Room Theme
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const AMBER: Color = Color::Rgb {
        r: 255,
        g: 191,
        b: 0,
    };
    pub const LEATHER: Color = Color::Rgb {
        r: 205,
        g: 133,
        b: 63,
    };
    pub const TEAL: Color = Color::Rgb {
        r: 64,
        g: 224,
        b: 208,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 120,
        g: 220,
        b: 120,
    };
    pub const ORANGE: Color = Color::Rgb {
        r: 255,
        g: 140,
        b: 0,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const BLUE: Color = Color::Rgb {
        r: 100,
        g: 149,
        b: 237,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const PAPER: Color = Color::Rgb {
        r: 250,
        g: 240,
        b: 220,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Box Drawing Characters
// ═══════════════════════════════════════════════════════════════════════════════

pub mod box_chars {
    // Double line box
    pub const DOUBLE_TOP_LEFT: &str = "╔";
    pub const DOUBLE_TOP_RIGHT: &str = "╗";
    pub const DOUBLE_BOTTOM_LEFT: &str = "╚";
    pub const DOUBLE_BOTTOM_RIGHT: &str = "╝";
    pub const DOUBLE_HORIZONTAL: &str = "═";
    pub const DOUBLE_VERTICAL: &str = "║";

    pub const SINGLE_HORIZONTAL: &str = "─";
    pub const SINGLE_VERTICAL: &str = "│";

    // Rounded box
    pub const ROUND_TOP_LEFT: &str = "╭";
    pub const ROUND_TOP_RIGHT: &str = "╮";
    pub const ROUND_BOTTOM_LEFT: &str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &str = "╯";

    // T-junctions
    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";

    // Arrows and bullets
    pub const ARROW_RIGHT: &str = "▶";
    pub const BULLET: &str = "●";
    pub const BULLET_EMPTY: &str = "○";
    pub const DIAMOND: &str = "◆";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

// ═══════════════════════════════════════════════════════════════════════════════
// Banner
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_banner() {
    let banner = r#"
     _   _                        _     _ _
    | | | | ___  _ __ ___   ___  | |   (_) |__  _ __ __ _ _ __ _   _
    | |_| |/ _ \| '_ ` _ \ / _ \ | |   | | '_ \| '__/ _` | '__| | | |
    |  _  | (_) | | | | | |  __/ | |___| | |_) | | | (_| | |  | |_| |
    |_| |_|\___/|_| |_| |_|\___| |_____|_|_.__/|_|  \__,_|_|   \__, |
                                                               |___/
"#;

    let lines: Vec<&str> = banner.lines().collect();
    let gradient_colors = [
        colors::AMBER,
        colors::AMBER,
        colors::AMBER,
        colors::LEATHER,
        colors::LEATHER,
        colors::ORANGE,
        colors::ORANGE,
    ];

    for (i, line) in lines.iter().enumerate() {
        let color = gradient_colors.get(i).unwrap_or(&colors::AMBER);
        println!("{}", line.with(*color).bold());
    }

    let subtitle = "  ───────────────────────  CATALOG SHELL  ───────────────────────";
    println!("{}", subtitle.with(colors::DIM));
    println!();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status Indicators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        box_chars::CHECK.to_string().with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        " {} {}",
        box_chars::CROSS_MARK.to_string().with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

pub fn print_warning(message: &str) {
    println!(
        " {} {}",
        "⚠".with(colors::ORANGE).bold(),
        message.with(colors::ORANGE)
    );
}

pub fn print_info(message: &str) {
    println!(
        " {} {}",
        "ℹ".with(colors::BLUE).bold(),
        message.with(colors::BLUE)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Section Headers
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_section_header(title: &str) {
    let width: usize = 60;
    let title_len = title.width();
    let padding = width.saturating_sub(title_len + 4) / 2;

    println!();
    print!("{}", box_chars::ROUND_TOP_LEFT.with(colors::AMBER));
    print!(
        "{}",
        box_chars::SINGLE_HORIZONTAL
            .repeat(padding)
            .with(colors::AMBER)
    );
    print!(
        " {} ",
        title.with(colors::AMBER).bold().attribute(Attribute::Italic)
    );
    print!(
        "{}",
        box_chars::SINGLE_HORIZONTAL
            .repeat(width.saturating_sub(title_len + 4 + padding))
            .with(colors::AMBER)
    );
    println!("{}", box_chars::ROUND_TOP_RIGHT.with(colors::AMBER));
}

pub fn print_section_footer() {
    let width = 60;
    print!("{}", box_chars::ROUND_BOTTOM_LEFT.with(colors::AMBER));
    print!(
        "{}",
        box_chars::SINGLE_HORIZONTAL
            .repeat(width)
            .with(colors::AMBER)
    );
    println!("{}", box_chars::ROUND_BOTTOM_RIGHT.with(colors::AMBER));
    println!();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Key-Value and List Display
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(colors::LEATHER),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::PAPER)
    );
}

pub fn print_list_item(item: &str, indent: usize) {
    let indent_str = "  ".repeat(indent);
    println!(
        "{}{}  {}",
        indent_str,
        box_chars::ARROW_RIGHT.with(colors::TEAL),
        item.with(colors::PAPER)
    );
}

pub fn print_empty_list(message: &str) {
    println!(
        "  {} {}",
        box_chars::BULLET_EMPTY.with(colors::DIM),
        message.with(colors::DIM).attribute(Attribute::Italic)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Table Display
// ═══════════════════════════════════════════════════════════════════════════════

/// Box-drawn table sized to the widest cell of each column.
///
/// `render` produces plain text so it can be tested; `print` adds colour.
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl TableBuilder {
    pub fn new(headers: &[&str]) -> Self {
        TableBuilder {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            col_widths: headers.iter().map(|h| h.width()).collect(),
        }
    }

    /// Missing trailing cells render empty, extra cells are ignored.
    pub fn add_row<S: AsRef<str>>(&mut self, row: &[S]) {
        let cells: Vec<String> = (0..self.headers.len())
            .map(|i| row.get(i).map(|c| c.as_ref().to_string()).unwrap_or_default())
            .collect();
        for (width, cell) in self.col_widths.iter_mut().zip(&cells) {
            *width = (*width).max(cell.width());
        }
        self.rows.push(cells);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn border(&self, left: &str, junction: &str, right: &str) -> String {
        let segments: Vec<String> = self
            .col_widths
            .iter()
            .map(|w| box_chars::SINGLE_HORIZONTAL.repeat(w + 2))
            .collect();
        format!("{}{}{}", left, segments.join(junction), right)
    }

    fn line(&self, cells: &[String]) -> String {
        let mut out = box_chars::SINGLE_VERTICAL.to_string();
        for (cell, width) in cells.iter().zip(&self.col_widths) {
            let padding = width.saturating_sub(cell.width());
            let _ = write!(out, " {}{} {}", cell, " ".repeat(padding), box_chars::SINGLE_VERTICAL);
        }
        out
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            self.border(box_chars::ROUND_TOP_LEFT, box_chars::T_TOP, box_chars::ROUND_TOP_RIGHT),
            self.line(&self.headers),
            self.border(box_chars::T_LEFT, box_chars::CROSS, box_chars::T_RIGHT),
        ];
        lines.extend(self.rows.iter().map(|row| self.line(row)));
        lines.push(self.border(
            box_chars::ROUND_BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::ROUND_BOTTOM_RIGHT,
        ));
        lines.join("\n")
    }

    pub fn print(&self) {
        for (i, line) in self.render().lines().enumerate() {
            // Header row stands out, borders and body share the frame colour.
            if i == 1 {
                println!("{}", line.with(colors::AMBER).bold());
            } else if i < 3 || i == self.rows.len() + 3 {
                println!("{}", line.with(colors::LEATHER));
            } else {
                println!("{}", line.with(colors::PAPER));
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Prompt Styling
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_prompt() -> String {
    format!(
        "{}{} ",
        "library".with(colors::AMBER).bold(),
        "❯".with(colors::LEATHER).bold(),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Welcome Message
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_welcome(catalog_location: &str, book_count: Option<usize>) {
    print_banner();

    let box_width = 64;
    let books = match book_count {
        Some(count) => count.to_string(),
        None => "unavailable".to_string(),
    };
    let lines = [
        ("Catalog", catalog_location),
        ("Books", books.as_str()),
        ("Version", env!("APP_VERSION")),
    ];

    print!("  {}", box_chars::DOUBLE_TOP_LEFT.with(colors::LEATHER));
    print!(
        "{}",
        box_chars::DOUBLE_HORIZONTAL
            .repeat(box_width)
            .with(colors::LEATHER)
    );
    println!("{}", box_chars::DOUBLE_TOP_RIGHT.with(colors::LEATHER));

    for (key, value) in lines {
        print!("  {}", box_chars::DOUBLE_VERTICAL.with(colors::LEATHER));
        let content = format!("  {} {}", format!("{}:", key).with(colors::DIM), value);
        let visible_len = key.width() + 2 + value.width() + 2;
        print!("{}", content);
        print!("{}", " ".repeat(box_width.saturating_sub(visible_len)));
        println!("{}", box_chars::DOUBLE_VERTICAL.with(colors::LEATHER));
    }

    print!("  {}", box_chars::DOUBLE_VERTICAL.with(colors::LEATHER));
    print!("{}", " ".repeat(box_width));
    println!("{}", box_chars::DOUBLE_VERTICAL.with(colors::LEATHER));

    print!("  {}", box_chars::DOUBLE_VERTICAL.with(colors::LEATHER));
    let help_msg = "  Type 'help' for available commands";
    print!("{}", help_msg.with(colors::DIM));
    print!("{}", " ".repeat(box_width - help_msg.len()));
    println!("{}", box_chars::DOUBLE_VERTICAL.with(colors::LEATHER));

    print!("  {}", box_chars::DOUBLE_BOTTOM_LEFT.with(colors::LEATHER));
    print!(
        "{}",
        box_chars::DOUBLE_HORIZONTAL
            .repeat(box_width)
            .with(colors::LEATHER)
    );
    println!("{}", box_chars::DOUBLE_BOTTOM_RIGHT.with(colors::LEATHER));
    println!();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Help Display
// ═══════════════════════════════════════════════════════════════════════════════

pub struct CommandHelp {
    pub group: &'static str,
    pub name: &'static str,
    pub args: &'static str,
    pub description: &'static str,
}

pub fn print_help(commands: &[CommandHelp]) {
    println!();
    print_section_header("Available Commands");
    println!();

    let mut groups: Vec<&str> = Vec::new();
    for cmd in commands {
        if !groups.contains(&cmd.group) {
            groups.push(cmd.group);
        }
    }

    let group_colors = [colors::AMBER, colors::TEAL, colors::LEATHER, colors::ORANGE];
    for (i, group) in groups.iter().enumerate() {
        let color: CtColor = group_colors[i % group_colors.len()];
        println!(
            "  {} {}",
            box_chars::DIAMOND.with(color),
            group.with(color).bold()
        );
        for cmd in commands.iter().filter(|c| c.group == *group) {
            println!(
                "      {} {}  {}",
                cmd.name.with(colors::GREEN).bold(),
                cmd.args.with(colors::DIM),
                cmd.description.with(colors::PAPER)
            );
        }
        println!();
    }

    print_section_footer();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Goodbye Message
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_goodbye() {
    println!();
    println!(
        "  {} {}",
        "📚".with(colors::AMBER),
        "Goodbye! Happy reading.".with(colors::LEATHER).bold()
    );
    println!();
}
