//! The fixed category taxonomy offered by the entry forms.

/// Category → item lists for the flat ledger's entry form.
pub const CATEGORIAS: &[(&str, &[&str])] = &[
    ("Gastos Diários", &["Açúcar", "Óleo", "Leite", "Pão de Queijo"]),
    ("A cada dois dias", &["Carne Moída", "Frango", "Abacaxi"]),
    (
        "Mercado Semanal",
        &["Coco", "Chocolate", "Pó Granulado", "Refrigerante", "Cenoura", "Temperos"],
    ),
    (
        "Quinzenal",
        &["Trigo", "Mantimentos", "Chapa", "Margarina", "Gás", "Embalagens"],
    ),
    (
        "Mensal",
        &["Funcionários", "Aluguel", "Água", "Energia", "Internet", "Maquineta", "Gastos Extras"],
    ),
];

/// Categories offered by the matrix variant's selector.
pub const MATRIX_CATEGORIAS: [&str; 6] = [
    "Alimentação",
    "Transporte",
    "Lazer",
    "Educação",
    "Saúde",
    "Outros",
];

/// The item list of one flat-ledger category, if the category exists.
pub fn itens_de(categoria: &str) -> Option<&'static [&'static str]> {
    CATEGORIAS
        .iter()
        .find(|(nome, _)| *nome == categoria)
        .map(|(_, itens)| *itens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_itens_de_known_categoria() {
        let itens = itens_de("Gastos Diários").unwrap();
        assert_eq!(itens, ["Açúcar", "Óleo", "Leite", "Pão de Queijo"]);
    }

    #[test]
    fn test_itens_de_unknown_categoria() {
        assert!(itens_de("Anual").is_none());
    }

    #[test]
    fn test_taxonomy_shape() {
        assert_eq!(CATEGORIAS.len(), 5);
        assert_eq!(MATRIX_CATEGORIAS.len(), 6);
    }
}
