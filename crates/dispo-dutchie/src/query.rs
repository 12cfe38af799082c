//! The fixed GraphQL documents sent upstream.

const RETAILERS_QUERY: &str = r"query Retailers {
  retailers {
    id
    name
    address
    phone
  }
}";

const MENU_PRODUCTS_QUERY: &str = r"query MenuProducts($retailerId: ID!) {
  menu(retailerId: $retailerId) {
    products {
      id
      name
      brand { name }
      category
      subcategory
      image
      description
      potencyThc { formatted }
      potencyCbd { formatted }
      variants {
        id
        option
        priceRec
        specialPriceRec
        quantity
      }
    }
  }
}";

/// One of the two queries this client knows how to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Every retailer visible to the API token. No variables.
    Retailers,
    /// One retailer's menu. Requires a `retailerId` variable.
    MenuProducts,
}

impl Query {
    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Query::Retailers => RETAILERS_QUERY,
            Query::MenuProducts => MENU_PRODUCTS_QUERY,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Query::Retailers => "Retailers",
            Query::MenuProducts => "MenuProducts",
        }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
