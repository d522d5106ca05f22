//! One ordering of a comprobante, shared by the original chain and the
//! markup writer.
//!
//! [`layout`] turns the model into a tree of [`Node`]s whose attributes carry
//! both their chain segment and their markup value. The chain walks the tree
//! pre-order (attributes, children, then trailer segments); the writer
//! renders the same tree as elements. A field added here reaches both.

use super::types::*;

/// One attribute position in the protocol order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attr {
    pub name: &'static str,
    /// Value written as an XML attribute; `None` leaves the attribute out.
    pub markup: Option<String>,
    /// Chain segment; `None` skips the position.
    pub chain: Option<String>,
}

impl Attr {
    /// Always occupies its chain position, even when blank. Blank values
    /// are not written to markup.
    fn required(name: &'static str, value: &str) -> Self {
        let value = value.trim();
        Self {
            name,
            markup: (!value.is_empty()).then(|| value.to_string()),
            chain: Some(value.to_string()),
        }
    }

    /// Present in chain and markup only when it has a value.
    fn optional(name: &'static str, value: Option<&str>) -> Self {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        Self {
            name,
            markup: value.map(str::to_string),
            chain: value.map(str::to_string),
        }
    }

    /// Written to markup only, never part of the chain.
    fn markup_only(name: &'static str, value: Option<&str>) -> Self {
        Self {
            chain: None,
            ..Self::optional(name, value)
        }
    }

    /// Different forms in markup and chain (the certificate serial).
    fn split(name: &'static str, markup: Option<&str>, chain: &str) -> Self {
        Self {
            name,
            markup: Self::optional(name, markup).markup,
            chain: Some(chain.trim().to_string()),
        }
    }
}

/// An element in the protocol order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    /// Local name, without the `cfdi:` prefix.
    pub name: &'static str,
    pub attrs: Vec<Attr>,
    pub children: Vec<Node>,
    /// Chain segments appended after the children (global tax totals).
    pub trailer: Vec<String>,
}

impl Node {
    fn new(name: &'static str, attrs: Vec<Attr>) -> Self {
        Self {
            name,
            attrs,
            children: Vec::new(),
            trailer: Vec::new(),
        }
    }

    fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Chain segments of this node and its subtree, in order.
    pub fn chain_segments<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.extend(self.attrs.iter().filter_map(|a| a.chain.as_deref()));
        for child in &self.children {
            child.chain_segments(out);
        }
        out.extend(self.trailer.iter().map(String::as_str));
    }
}

/// Lay out `c` in CFDI 4.0 order. `no_certificado_chain` is the plain-text
/// serial that occupies the certificate position of the chain; markup keeps
/// the hex form stored on the model.
pub(crate) fn layout(c: &Comprobante, no_certificado_chain: &str) -> Node {
    let root = Node::new(
        "Comprobante",
        vec![
            Attr::required("Version", CFDI_VERSION),
            Attr::optional("Serie", c.serie.as_deref()),
            Attr::optional("Folio", c.folio.as_deref()),
            Attr::required("Fecha", &c.fecha),
            Attr::markup_only("Sello", c.sello.as_deref()),
            Attr::optional("FormaPago", c.forma_pago.as_deref()),
            Attr::split(
                "NoCertificado",
                c.no_certificado.as_deref(),
                no_certificado_chain,
            ),
            Attr::markup_only("Certificado", c.certificado.as_deref()),
            Attr::optional("CondicionesDePago", c.condiciones_de_pago.as_deref()),
            Attr::required("SubTotal", &c.sub_total),
            Attr::optional("Descuento", c.descuento.as_deref()),
            Attr::required("Moneda", &c.moneda),
            Attr::optional("TipoCambio", c.tipo_cambio.as_deref()),
            Attr::required("Total", &c.total),
            Attr::required("TipoDeComprobante", &c.tipo_de_comprobante),
            Attr::required("Exportacion", &c.exportacion),
            Attr::optional("MetodoPago", c.metodo_pago.as_deref()),
            Attr::required("LugarExpedicion", &c.lugar_expedicion),
            Attr::optional("Confirmacion", c.confirmacion.as_deref()),
        ],
    );

    let mut children = Vec::new();

    if let Some(ig) = &c.informacion_global {
        children.push(Node::new(
            "InformacionGlobal",
            vec![
                Attr::required("Periodicidad", &ig.periodicidad),
                Attr::required("Meses", &ig.meses),
                Attr::required("Año", &ig.anio),
            ],
        ));
    }

    if let Some(rel) = &c.cfdi_relacionados {
        let related = rel
            .uuids
            .iter()
            .map(|uuid| Node::new("CfdiRelacionado", vec![Attr::required("UUID", uuid)]))
            .collect();
        children.push(
            Node::new(
                "CfdiRelacionados",
                vec![Attr::required("TipoRelacion", &rel.tipo_relacion)],
            )
            .with_children(related),
        );
    }

    // A missing issuer or recipient still occupies its chain positions
    let emisor = c.emisor.clone().unwrap_or_default();
    children.push(Node::new(
        "Emisor",
        vec![
            Attr::required("Rfc", &emisor.rfc),
            Attr::required("Nombre", &emisor.nombre),
            Attr::required("RegimenFiscal", &emisor.regimen_fiscal),
            Attr::optional("FacAtrAdquirente", emisor.fac_atr_adquirente.as_deref()),
        ],
    ));

    let receptor = c.receptor.clone().unwrap_or_default();
    children.push(Node::new(
        "Receptor",
        vec![
            Attr::required("Rfc", &receptor.rfc),
            Attr::required("Nombre", &receptor.nombre),
            Attr::required(
                "DomicilioFiscalReceptor",
                &receptor.domicilio_fiscal_receptor,
            ),
            Attr::optional("ResidenciaFiscal", receptor.residencia_fiscal.as_deref()),
            Attr::optional("NumRegIdTrib", receptor.num_reg_id_trib.as_deref()),
            Attr::required("RegimenFiscalReceptor", &receptor.regimen_fiscal_receptor),
            Attr::required("UsoCFDI", &uso_cfdi(&receptor.uso_cfdi)),
        ],
    ));

    children.push(
        Node::new("Conceptos", Vec::new())
            .with_children(c.conceptos.iter().map(concepto).collect()),
    );

    if let Some(impuestos) = &c.impuestos {
        children.push(impuestos_globales(impuestos));
    }

    root.with_children(children)
}

/// `UsoCFDI` as it must appear in chain and markup: the first underscore is
/// dropped, so `S_01` becomes `S01`.
pub(crate) fn uso_cfdi(raw: &str) -> String {
    raw.replacen('_', "", 1)
}

fn concepto(con: &Concepto) -> Node {
    let mut children = Vec::new();

    if let Some(imp) = &con.impuestos {
        let mut groups = Vec::new();
        if let Some(traslados) = &imp.traslados {
            groups.push(
                Node::new("Traslados", Vec::new())
                    .with_children(traslados.iter().map(traslado).collect()),
            );
        }
        if let Some(retenciones) = &imp.retenciones {
            groups.push(
                Node::new("Retenciones", Vec::new())
                    .with_children(retenciones.iter().map(retencion).collect()),
            );
        }
        children.push(Node::new("Impuestos", Vec::new()).with_children(groups));
    }

    children.extend(
        con.cuenta_predial
            .iter()
            .map(|numero| Node::new("CuentaPredial", vec![Attr::required("Numero", numero)])),
    );

    Node::new(
        "Concepto",
        vec![
            Attr::required("ClaveProdServ", &con.clave_prod_serv),
            Attr::optional("NoIdentificacion", con.no_identificacion.as_deref()),
            Attr::required("Cantidad", &con.cantidad),
            Attr::required("ClaveUnidad", &con.clave_unidad),
            Attr::optional("Unidad", con.unidad.as_deref()),
            Attr::required("Descripcion", &con.descripcion),
            Attr::required("ValorUnitario", &con.valor_unitario),
            Attr::required("Importe", &con.importe),
            Attr::optional("Descuento", con.descuento.as_deref()),
            Attr::required("ObjetoImp", &con.objeto_imp),
        ],
    )
    .with_children(children)
}

fn traslado(t: &Traslado) -> Node {
    let mut attrs = vec![
        Attr::required("Base", &t.base),
        Attr::required("Impuesto", &t.impuesto),
        Attr::required("TipoFactor", t.tipo_factor.as_str()),
    ];
    if !t.tipo_factor.is_exento() {
        attrs.push(Attr::required(
            "TasaOCuota",
            t.tasa_o_cuota.as_deref().unwrap_or_default(),
        ));
        attrs.push(Attr::required(
            "Importe",
            t.importe.as_deref().unwrap_or_default(),
        ));
    }
    Node::new("Traslado", attrs)
}

fn retencion(r: &Retencion) -> Node {
    Node::new(
        "Retencion",
        vec![
            Attr::required("Base", &r.base),
            Attr::required("Impuesto", &r.impuesto),
            Attr::required("TipoFactor", r.tipo_factor.as_str()),
            Attr::required("TasaOCuota", &r.tasa_o_cuota),
            Attr::required("Importe", &r.importe),
        ],
    )
}

fn impuestos_globales(imp: &Impuestos) -> Node {
    let mut groups = Vec::new();

    if let Some(retenciones) = &imp.retenciones {
        let mut node = Node::new("Retenciones", Vec::new()).with_children(
            retenciones
                .iter()
                .map(|r| {
                    Node::new(
                        "Retencion",
                        vec![
                            Attr::required("Impuesto", &r.impuesto),
                            Attr::required("Importe", &r.importe),
                        ],
                    )
                })
                .collect(),
        );
        node.trailer
            .push(total(imp.total_impuestos_retenidos.as_deref()));
        groups.push(node);
    }

    if let Some(traslados) = &imp.traslados {
        let mut node = Node::new("Traslados", Vec::new()).with_children(
            traslados
                .iter()
                .map(|t| {
                    Node::new(
                        "Traslado",
                        vec![
                            Attr::required("Base", &t.base),
                            Attr::required("Impuesto", &t.impuesto),
                            Attr::required("TipoFactor", t.tipo_factor.as_str()),
                            Attr::required("TasaOCuota", &t.tasa_o_cuota),
                            Attr::required("Importe", &t.importe),
                        ],
                    )
                })
                .collect(),
        );
        node.trailer
            .push(total(imp.total_impuestos_trasladados.as_deref()));
        groups.push(node);
    }

    Node::new(
        "Impuestos",
        vec![
            Attr::markup_only(
                "TotalImpuestosRetenidos",
                imp.total_impuestos_retenidos.as_deref(),
            ),
            Attr::markup_only(
                "TotalImpuestosTrasladados",
                imp.total_impuestos_trasladados.as_deref(),
            ),
        ],
    )
    .with_children(groups)
}

fn total(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}
