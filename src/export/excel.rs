//! Excel出力
//!
//! 「Resumen」シートに集計、「Productos」シートに分類済みの行を書き出す。

use crate::error::{GapError, Result};
use catalog_gap_common::{GapReport, MatchStatus};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use std::borrow::Cow;
use std::path::Path;

/// 1セルに書ける最大文字数
const MAX_CELL_CHARS: usize = 32_767;

/// ハイパーリンクにできるURLの最大文字数
const MAX_URL_CHARS: usize = 2_079;

const PRODUCT_HEADERS: &[(&str, f64)] = &[
    ("Marca", 18.0),
    ("Código", 18.0),
    ("Descripción", 60.0),
    ("Estado", 16.0),
    ("Marca propia", 12.0),
    ("Producto similar", 18.0),
    ("Marca similar", 18.0),
    ("Similitud", 10.0),
    ("Verificación", 14.0),
    ("Búsqueda", 40.0),
];

fn status_label(status: MatchStatus) -> &'static str {
    match status {
        MatchStatus::Found => "Encontrado",
        MatchStatus::Missing => "Falta en sistema",
        MatchStatus::CompetitorOnly => "Competencia",
    }
}

fn xlsx_err(context: &str) -> impl Fn(XlsxError) -> GapError + '_ {
    move |e| GapError::ExcelGeneration(format!("{}: {}", context, e))
}

/// セル上限を超える文字列は切り詰める
fn fit_cell(value: &str) -> Cow<'_, str> {
    if value.chars().count() <= MAX_CELL_CHARS {
        return Cow::Borrowed(value);
    }
    tracing::warn!(chars = value.chars().count(), "セルの文字数上限を超えたため切り詰め");
    Cow::Owned(value.chars().take(MAX_CELL_CHARS).collect())
}

/// 文字列セルを書き込む（ギャップ行は背景色付き）
fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    highlight: Option<&Format>,
    value: &str,
) -> std::result::Result<(), XlsxError> {
    let value = fit_cell(value);
    let value = value.as_ref();
    match highlight {
        Some(format) => sheet.write_string_with_format(row, col, value, format)?,
        None => sheet.write_string(row, col, value)?,
    };
    Ok(())
}

pub fn generate_excel(report: &GapReport, output_path: &Path, title: &str) -> Result<()> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x305496))
        .set_align(FormatAlign::Center);
    let label_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5));
    let score_format = Format::new().set_num_format("0.000");
    let missing_format = Format::new().set_background_color(Color::RGB(0xFCE4D6));

    // 集計シート
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Resumen").map_err(xlsx_err("シート名設定エラー"))?;
        sheet.set_column_width(0, 28.0).map_err(xlsx_err("列幅設定エラー"))?;
        sheet.set_column_width(1, 24.0).map_err(xlsx_err("列幅設定エラー"))?;

        sheet
            .write_string_with_format(0, 0, title, &header_format)
            .map_err(xlsx_err("タイトル書き込みエラー"))?;

        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
        let summary: [(&str, String); 7] = [
            ("Categoría", report.category_processed.clone()),
            ("Filas procesadas", report.total_rows_processed.to_string()),
            ("Productos clasificados", report.market_products.len().to_string()),
            ("Faltan en sistema", report.total_missing_in_system.to_string()),
            ("Competencia", report.count_by_status(MatchStatus::CompetitorOnly).to_string()),
            ("Encontrados", report.count_by_status(MatchStatus::Found).to_string()),
            ("Generado", generated_at),
        ];

        for (i, (label, value)) in summary.iter().enumerate() {
            let row = i as u32 + 2;
            sheet
                .write_string_with_format(row, 0, *label, &label_format)
                .map_err(xlsx_err("集計書き込みエラー"))?;
            sheet
                .write_string(row, 1, value.as_str())
                .map_err(xlsx_err("集計書き込みエラー"))?;
        }
    }

    // 商品シート
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Productos").map_err(xlsx_err("シート名設定エラー"))?;

        for (col, (header, width)) in PRODUCT_HEADERS.iter().enumerate() {
            let col = col as u16;
            sheet
                .set_column_width(col, *width)
                .map_err(xlsx_err("列幅設定エラー"))?;
            sheet
                .write_string_with_format(0, col, *header, &header_format)
                .map_err(xlsx_err("ヘッダー書き込みエラー"))?;
        }

        for (i, product) in report.market_products.iter().enumerate() {
            let row = i as u32 + 1;
            let highlight = (product.match_status == MatchStatus::Missing).then_some(&missing_format);

            let (similar_code, similar_brand) = product
                .similar_product
                .as_ref()
                .map(|p| (p.code.as_str(), p.brand_name.as_str()))
                .unwrap_or(("", ""));

            write_cell(sheet, row, 0, highlight, &product.brand_name).map_err(xlsx_err("行書き込みエラー"))?;
            write_cell(sheet, row, 1, highlight, &product.code).map_err(xlsx_err("行書き込みエラー"))?;
            write_cell(sheet, row, 2, highlight, &product.description).map_err(xlsx_err("行書き込みエラー"))?;
            write_cell(sheet, row, 3, highlight, status_label(product.match_status)).map_err(xlsx_err("行書き込みエラー"))?;
            write_cell(sheet, row, 4, highlight, if product.is_known_brand { "Sí" } else { "No" })
                .map_err(xlsx_err("行書き込みエラー"))?;
            write_cell(sheet, row, 5, highlight, similar_code).map_err(xlsx_err("行書き込みエラー"))?;
            write_cell(sheet, row, 6, highlight, similar_brand).map_err(xlsx_err("行書き込みエラー"))?;

            if let Some(similar) = &product.similar_product {
                sheet
                    .write_number_with_format(row, 7, similar.similarity_score, &score_format)
                    .map_err(xlsx_err("行書き込みエラー"))?;
            }

            write_cell(sheet, row, 8, highlight, &product.verification_status.to_string())
                .map_err(xlsx_err("行書き込みエラー"))?;
            if product.search_url.chars().count() > MAX_URL_CHARS {
                tracing::warn!(code = %product.code, "検索URLが長すぎるためリンクを省略");
            } else if !product.search_url.is_empty() {
                sheet
                    .write_url(row, 9, product.search_url.as_str())
                    .map_err(xlsx_err("URL書き込みエラー"))?;
            }
        }
    }

    workbook
        .save(output_path)
        .map_err(xlsx_err("Excel保存エラー"))?;

    Ok(())
}
