use crate::core::layout::{Node, layout};
use crate::core::{CfdiError, Comprobante};

use super::xml_utils::{XmlResult, XmlWriter};
use super::{CFDI_NS, CFDI_PREFIX, SCHEMA_LOCATION, XSI_NS};

/// Render a comprobante as CFDI 4.0 markup.
///
/// Attributes follow the original-chain order, with `Sello`,
/// `NoCertificado` and `Certificado` taken from the model as written by the
/// sealer. Optional attributes are left out when absent and container
/// elements appear only when the model holds their node. The document is
/// not validated first.
pub fn to_cfdi_xml(c: &Comprobante) -> XmlResult {
    // The plain-text serial only matters to the chain
    let root = layout(c, "");

    let mut w = XmlWriter::new()?;

    let mut attrs = vec![
        ("xmlns:cfdi", CFDI_NS),
        ("xmlns:xsi", XSI_NS),
        ("xsi:schemaLocation", SCHEMA_LOCATION),
    ];
    attrs.extend(markup_attrs(&root));

    let name = qualified(root.name);
    w.start_element_with_attrs(&name, &attrs)?;
    for child in &root.children {
        write_node(&mut w, child)?;
    }
    w.end_element(&name)?;

    w.into_string()
}

fn write_node(w: &mut XmlWriter, node: &Node) -> Result<(), CfdiError> {
    let name = qualified(node.name);
    let attrs = markup_attrs(node);

    if node.children.is_empty() {
        w.empty_element_with_attrs(&name, &attrs)?;
        return Ok(());
    }

    w.start_element_with_attrs(&name, &attrs)?;
    for child in &node.children {
        write_node(w, child)?;
    }
    w.end_element(&name)?;
    Ok(())
}

fn markup_attrs(node: &Node) -> Vec<(&str, &str)> {
    node.attrs
        .iter()
        .filter_map(|a| a.markup.as_deref().map(|v| (a.name, v)))
        .collect()
}

fn qualified(name: &str) -> String {
    format!("{CFDI_PREFIX}:{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;

    #[test]
    fn root_declares_namespaces_before_version() {
        let xml = to_cfdi_xml(&Comprobante::default()).unwrap();
        let root = xml.lines().nth(1).unwrap();
        assert!(root.starts_with(
            "<cfdi:Comprobante xmlns:cfdi=\"http://www.sat.gob.mx/cfd/4\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
             xsi:schemaLocation=\"http://www.sat.gob.mx/cfd/4 http://www.sat.gob.mx/sitio_internet/cfd/4/cfdv40.xsd\" \
             Version=\"4.0\""
        ));
        assert!(xml.contains("<cfdi:Conceptos/>"));
        assert!(!xml.contains("<cfdi:Impuestos"));
    }

    #[test]
    fn empty_tax_lists_keep_their_container() {
        let c = Comprobante {
            conceptos: vec![Concepto {
                objeto_imp: "02".into(),
                impuestos: Some(ConceptoImpuestos {
                    traslados: Some(Vec::new()),
                    retenciones: None,
                }),
                ..Default::default()
            }],
            ..Default::default()
        };
        let xml = to_cfdi_xml(&c).unwrap();
        assert!(xml.contains("<cfdi:Traslados/>"));
        assert!(!xml.contains("<cfdi:Retenciones"));
    }
}
