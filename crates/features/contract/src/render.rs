use crate::data::ContractData;
use crate::error::ContractError;
use crate::fonts::Font;
use crate::image::{Encoding, SignatureImage, deflate};
use crate::layout::{Composer, ImageSlot, PAGE_HEIGHT, PAGE_WIDTH, Page, SignatureColumn};
use crate::pdf::{ObjectId, PdfWriter, literal, num};
use crate::template::Template;
use std::fmt::Write as _;

const DOCUMENT_TITLE: &str = "BRITE-PROVIDER AGREEMENT";
const COUNTER_SIGNER: &str = "Joshua Rosensweet";

/// Renders the agreement for one practice.
///
/// `counter_signature` is drawn in the BRITE box; the provider's own signature comes from
/// `data`. Either box shows a ruled line when its image is absent.
///
/// # Errors
///
/// Returns [`ContractError::Io`] if compression fails.
pub fn render(
    template: &Template,
    data: &ContractData,
    counter_signature: Option<&SignatureImage>,
) -> Result<Vec<u8>, ContractError> {
    let values = data.placeholders();
    let values: Vec<(&str, &str)> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let mut composer = Composer::new();
    for block in template.fill(&values) {
        composer.block(&block);
    }

    let mut images = Vec::new();
    let counter_slot = counter_signature.map(|image| register(&mut images, image));
    let provider_slot = data.signature.as_ref().map(|image| register(&mut images, image));

    let date = data.formatted_date();
    let columns = [
        SignatureColumn {
            title: "BRITE :",
            above: vec![format!("By: {COUNTER_SIGNER}"), "BRITE/Menopause Method, Inc".to_owned()],
            image: counter_slot,
            placeholder: "Signature",
            below: vec![
                format!("Name: {COUNTER_SIGNER}"),
                "Title: Vice President".to_owned(),
                format!("Date: {date}"),
            ],
        },
        SignatureColumn {
            title: "PROVIDER :",
            above: vec![format!("By: {}", data.signer_name), data.practice_name.clone()],
            image: provider_slot,
            placeholder: "Signature Required",
            below: vec![format!("Date: {date}")],
        },
    ];
    composer.signatures(&columns);

    let pages = composer.finish();
    tracing::debug!(pages = pages.len(), images = images.len(), "Agreement laid out");

    write_document(&pages, &images, &data.practice_name)
}

fn register<'a>(images: &mut Vec<(String, &'a SignatureImage)>, image: &'a SignatureImage) -> ImageSlot {
    let name = format!("Im{}", images.len());
    images.push((name.clone(), image));
    ImageSlot { name, width: image.width(), height: image.height() }
}

fn write_document(
    pages: &[Page],
    images: &[(String, &SignatureImage)],
    subject: &str,
) -> Result<Vec<u8>, ContractError> {
    let mut pdf = PdfWriter::new();
    let catalog = pdf.reserve();
    let page_tree = pdf.reserve();

    let mut fonts = String::new();
    for font in Font::ALL {
        let id = pdf.add(format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
            font.base_font()
        ));
        let _ = write!(fonts, " /{} {}", font.resource(), id.reference());
    }

    let mut xobjects = String::new();
    for (name, image) in images {
        let id = add_image(&mut pdf, image);
        let _ = write!(xobjects, " /{name} {}", id.reference());
    }

    let resources = pdf.add(format!(
        "<< /ProcSet [/PDF /Text /ImageB /ImageC] /Font <<{fonts} >> /XObject <<{xobjects} >> >>"
    ));

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let contents = pdf.add_stream("/Filter /FlateDecode", &deflate(&page.content)?);
        let id = pdf.add(format!(
            "<< /Type /Page /Parent {} /MediaBox [0 0 {} {}] /Resources {} /Contents {} >>",
            page_tree.reference(),
            num(PAGE_WIDTH),
            num(PAGE_HEIGHT),
            resources.reference(),
            contents.reference(),
        ));
        kids.push(id.reference());
    }

    pdf.set(page_tree, format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), kids.len()));
    pdf.set(catalog, format!("<< /Type /Catalog /Pages {} >>", page_tree.reference()));

    let mut info = b"<< /Title ".to_vec();
    info.extend(literal(DOCUMENT_TITLE.as_bytes()));
    info.extend_from_slice(b" /Subject ");
    info.extend(literal(&crate::fonts::encode(subject)));
    info.extend_from_slice(b" /Producer ");
    info.extend(literal(concat!("brite-contract ", env!("CARGO_PKG_VERSION")).as_bytes()));
    info.extend_from_slice(b" >>");
    let info = pdf.add(info);

    pdf.finish(catalog, info)
}

fn add_image(pdf: &mut PdfWriter, image: &SignatureImage) -> ObjectId {
    let (width, height) = (image.width(), image.height());

    let mask = image.alpha().map(|alpha| {
        pdf.add_stream(
            &format!(
                "/Type /XObject /Subtype /Image /Width {width} /Height {height} /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode"
            ),
            alpha,
        )
    });

    let filter = match image.encoding() {
        Encoding::Flate => "FlateDecode",
        Encoding::Dct => "DCTDecode",
    };
    let mut dict = format!(
        "/Type /XObject /Subtype /Image /Width {width} /Height {height} /ColorSpace /{} /BitsPerComponent 8 /Filter /{filter}",
        image.color_space().pdf_name()
    );
    if let Some(mask) = mask {
        let _ = write!(dict, " /SMask {}", mask.reference());
    }

    pdf.add_stream(&dict, image.data())
}
