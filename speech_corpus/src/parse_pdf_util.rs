use std::collections::HashMap;
use std::path::Path;
use pdf::content::Operation;

/// A PDF TJ operation takes a string, or rather an array of strings and other stuff. Extract just the string. Also works for Tj, ' and ".
/// A large negative kerning adjustment inside a TJ array is how many producers write a space, so it becomes one.
pub(crate) fn extract_string(op:&Operation) -> String {
    let mut res = String::new();
    for o in &op.operands {
        if let Ok(a) = o.as_array() {
            for p in a {
                if let Ok(s) = p.as_string() {
                    if let Ok(s) = s.as_str() {
                        res.push_str(&s);
                    }
                } else if let Ok(n) = p.as_number() {
                    if n < -200.0 && !res.ends_with(' ') { res.push(' '); }
                }
            }
        } else if let Ok(s) = o.as_string() {
            if let Ok(s) = s.as_str() {
                res.push_str(&s);
            }
        }
    }
    res
}

/// A line of text in a PDF, with the position at which it starts.
#[derive(Debug,Clone,PartialEq)]
pub(crate) struct PdfLine {
    pub page : usize,
    pub x : f32,
    pub y : f32,
    pub text : String,
}

/// Tracks where the next piece of text will be placed. Only translation is tracked, which is all that matters for telling lines and indentation apart.
#[derive(Default)]
struct TextPosition {
    line_x : f32,
    line_y : f32,
    leading : f32,
}

impl TextPosition {
    fn next_line(&mut self) { self.line_y -= self.leading; }
}

/// Accumulates shown text into lines. Text at the same height as the previous text continues that line.
#[derive(Default)]
pub(crate) struct PdfLineBuilder {
    lines : Vec<PdfLine>,
}

impl PdfLineBuilder {
    pub(crate) fn add_text(&mut self,page:usize,x:f32,y:f32,text:String) {
        if text.is_empty() { return }
        if let Some(last) = self.lines.last_mut() {
            if last.page==page && (last.y-y).abs()<0.5 {
                last.text.push_str(&text);
                return;
            }
        }
        self.lines.push(PdfLine{ page, x, y, text });
    }

    /// Follow the text positioning and showing operators of one page's content stream.
    pub(crate) fn add_operations(&mut self,page:usize,operations:&[Operation]) {
        let mut position = TextPosition::default();
        for op in operations {
            let number = |i:usize| op.operands.get(i).and_then(|o|o.as_number().ok());
            match op.operator.as_str() {
                "BT" => { position.line_x=0.0; position.line_y=0.0; }
                "Tm" if op.operands.len()==6 => {
                    if let (Some(x),Some(y)) = (number(4),number(5)) { position.line_x=x; position.line_y=y; }
                }
                "Td" | "TD" if op.operands.len()==2 => {
                    if let (Some(tx),Some(ty)) = (number(0),number(1)) {
                        position.line_x+=tx;
                        position.line_y+=ty;
                        if op.operator=="TD" { position.leading = -ty; }
                    }
                }
                "TL" => { if let Some(l) = number(0) { position.leading=l; } }
                "T*" => position.next_line(),
                "'" | "\"" => {
                    position.next_line();
                    self.add_text(page,position.line_x,position.line_y,extract_string(op));
                }
                "TJ" | "Tj" => self.add_text(page,position.line_x,position.line_y,extract_string(op)),
                _ => {}
            }
        }
    }

    pub(crate) fn finish(self) -> Vec<PdfLine> { self.lines }
}

/// Take a PDF file, and extract the text as lines in the order they are drawn, with their starting position.
pub(crate) fn parse_pdf_to_lines(path:&Path) -> anyhow::Result<Vec<PdfLine>> {
    let pdf = pdf::file::File::open(path)?;
    let mut builder = PdfLineBuilder::default();
    for (page_no,page) in pdf.pages().enumerate() {
        let page = page?;
        if let Some(content) = &page.contents {
            builder.add_operations(page_no,&content.operations);
        }
    }
    Ok(builder.finish())
}

/// A gap between two lines this many times the usual line spacing separates paragraphs.
const PARAGRAPH_GAP : f32 = 1.5;

/// The most common distance between consecutive lines on the same page.
fn usual_line_spacing(lines:&[PdfLine]) -> Option<f32> {
    let mut counts : HashMap<i32,usize> = HashMap::new();
    for pair in lines.windows(2) {
        let dy = pair[0].y-pair[1].y;
        if pair[0].page==pair[1].page && dy>0.0 { *counts.entry(dy.round() as i32).or_default()+=1; }
    }
    counts.into_iter().max_by_key(|&(dy,count)|(count,-dy)).map(|(dy,_)|dy as f32)
}

/// The text of the lines as rows, with an empty row wherever a paragraph ends: before a line
/// that is clearly further below the previous one than usual, and at a page break that follows
/// the end of a sentence.
pub(crate) fn text_rows(lines:&[PdfLine]) -> Vec<String> {
    let spacing = usual_line_spacing(lines);
    let mut rows : Vec<String> = vec![];
    for (i,line) in lines.iter().enumerate() {
        if let Some(previous) = i.checked_sub(1).map(|p|&lines[p]) {
            let gap = previous.page==line.page && spacing.map(|s|previous.y-line.y>s*PARAGRAPH_GAP).unwrap_or(false);
            let sentence_end = previous.page!=line.page && previous.text.trim_end().ends_with(['.','!','?']);
            if gap || sentence_end { rows.push(String::new()); }
        }
        rows.push(line.text.trim().to_string());
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf::primitive::{PdfString, Primitive};

    fn op(operator:&str,operands:Vec<Primitive>) -> Operation {
        Operation{ operator: operator.to_string(), operands }
    }

    fn numbers(values:&[f32]) -> Vec<Primitive> { values.iter().map(|&v|Primitive::Number(v)).collect() }

    fn string(s:&str) -> Primitive { Primitive::String(PdfString::new(s.as_bytes().to_vec())) }

    fn line(page:usize,y:f32,text:&str) -> PdfLine { PdfLine{ page, x: 50.0, y, text: text.to_string() } }

    #[test]
    fn test_line_builder() {
        let mut builder = PdfLineBuilder::default();
        builder.add_text(0,56.0,700.0,"O Sr. Presidente: — ".to_string());
        builder.add_text(0,140.0,700.2,"Srs. Deputados,".to_string());
        builder.add_text(0,42.0,688.0,"está aberta a sessão.".to_string());
        builder.add_text(1,42.0,688.0,"".to_string());
        builder.add_text(1,42.0,688.0,"Next page".to_string());
        let lines = builder.finish();
        assert_eq!(3,lines.len());
        assert_eq!("O Sr. Presidente: — Srs. Deputados,",lines[0].text);
        assert_eq!(56.0,lines[0].x);
        assert_eq!(1,lines[2].page);
    }

    #[test]
    fn test_kerning_becomes_space() {
        let shown = op("TJ",vec![Primitive::Array(vec![string("Srs."),Primitive::Number(-250.0),string("Depu"),Primitive::Number(-40.0),string("tados")])]);
        assert_eq!("Srs. Deputados",extract_string(&shown));
        assert_eq!("x",extract_string(&op("Tj",vec![string("x")])));
    }

    #[test]
    fn test_text_positioning_operators() {
        let mut builder = PdfLineBuilder::default();
        builder.add_operations(0,&[
            op("BT",vec![]),
            op("Tm",numbers(&[1.0,0.0,0.0,1.0,56.0,700.0])),
            op("TJ",vec![Primitive::Array(vec![string("O Sr."),Primitive::Number(-250.0),string("Presidente:")])]),
            op("Td",numbers(&[-14.0,-12.0])),
            op("Tj",vec![string("Srs. Deputados,")]),
            op("TL",numbers(&[14.0])),
            op("T*",vec![]),
            op("Tj",vec![string("temos quórum.")]),
            op("'",vec![string("Quarta linha")]),
            op("TD",numbers(&[10.0,-20.0])),
            op("T*",vec![]),
            op("Tj",vec![string("Recuada")]),
            op("ET",vec![]),
        ]);
        builder.add_operations(1,&[op("BT",vec![]),op("Td",numbers(&[42.0,800.0])),op("Tj",vec![string("Página dois")])]);
        let lines = builder.finish();
        assert_eq!(vec![
            PdfLine{ page: 0, x: 56.0, y: 700.0, text: "O Sr. Presidente:".to_string() },
            PdfLine{ page: 0, x: 42.0, y: 688.0, text: "Srs. Deputados,".to_string() },
            PdfLine{ page: 0, x: 42.0, y: 674.0, text: "temos quórum.".to_string() },
            PdfLine{ page: 0, x: 42.0, y: 660.0, text: "Quarta linha".to_string() },
            PdfLine{ page: 0, x: 52.0, y: 620.0, text: "Recuada".to_string() },
            PdfLine{ page: 1, x: 42.0, y: 800.0, text: "Página dois".to_string() },
        ],lines);
    }

    #[test]
    fn test_text_rows() {
        let lines = vec![
            line(0,700.0,"First paragraph"),
            line(0,688.0,"continues."),
            line(0,664.0,"Second paragraph"),
            line(0,652.0,"runs over the"),
            line(1,800.0,"page break."),
            line(1,788.0,"Third."),
            line(2,800.0,"Fourth."),
        ];
        assert_eq!(vec!["First paragraph","continues.","","Second paragraph","runs over the","page break.","Third.","","Fourth."],text_rows(&lines));
        assert!(text_rows(&[]).is_empty());
    }
}
