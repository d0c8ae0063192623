//! Browsing session - filter state, inputs and the cards on screen
//!
//! Cards are keyed by template id. A template that stays visible across a
//! filter change keeps its card (open panel, added parameters); one that
//! leaves the visible set loses its card for good.

use cmdforge_common::{render, Catalog, FilterState, InputValues, Template, TemplateCard, Visible};

use crate::output::WORDLIST_CATEGORY;

pub struct Session<'c> {
    catalog: &'c Catalog,
    filters: FilterState,
    inputs: InputValues,
    cards: Vec<(&'c Template, TemplateCard)>,
}

impl<'c> Session<'c> {
    pub fn new(catalog: &'c Catalog, inputs: InputValues) -> Self {
        Self {
            catalog,
            filters: FilterState::new(),
            inputs,
            cards: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn inputs(&self) -> &InputValues {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut InputValues {
        &mut self.inputs
    }

    /// Apply a filter change and resync the cards
    pub fn update_filters(&mut self, change: impl FnOnce(&mut FilterState)) {
        change(&mut self.filters);
        self.refresh();
    }

    pub fn visible(&self) -> Visible<'c> {
        self.filters.visible(self.catalog)
    }

    fn refresh(&mut self) {
        let visible = self.visible().into_templates();
        let mut previous = std::mem::take(&mut self.cards);

        self.cards = visible
            .into_iter()
            .map(|template| {
                let card = match previous.iter().position(|(t, _)| t.id == template.id) {
                    Some(pos) => previous.swap_remove(pos).1,
                    None => TemplateCard::new(template),
                };
                (template, card)
            })
            .collect();
    }

    /// Cards in display order
    pub fn cards(&self) -> &[(&'c Template, TemplateCard)] {
        &self.cards
    }

    /// Card by its 1-based display number
    pub fn card_mut(&mut self, number: usize) -> Option<(&'c Template, &mut TemplateCard)> {
        let index = number.checked_sub(1)?;
        self.cards
            .get_mut(index)
            .map(|(template, card)| (*template, card))
    }

    pub fn rendered(&self, template: &Template) -> String {
        render(&template.template, &self.inputs)
    }

    /// Presentation policy: the wordlist field belongs to web enumeration
    pub fn shows_wordlist_path(&self) -> bool {
        self.filters.is_category_selected(WORDLIST_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn test_new_session_shows_nothing() {
        let catalog = catalog();
        let session = Session::new(&catalog, InputValues::default());
        assert_eq!(session.visible(), Visible::NothingSelected);
        assert!(session.cards().is_empty());
    }

    #[test]
    fn test_cards_follow_visible_set() {
        let catalog = catalog();
        let mut session = Session::new(&catalog, InputValues::default());
        session.update_filters(|f| f.select_category("network"));

        let ids: Vec<&str> = session.cards().iter().map(|(t, _)| t.id.as_str()).collect();
        let expected: Vec<&str> = catalog
            .templates()
            .iter()
            .filter(|t| t.category_id == "network")
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_card_state_survives_while_visible() {
        let catalog = catalog();
        let mut session = Session::new(&catalog, InputValues::default());
        session.update_filters(|f| f.select_category("network"));

        let (template, card) = session.card_mut(1).unwrap();
        assert_eq!(template.id, "nmap-default");
        card.add_param("-v");

        // Narrowing keeps nmap-default visible
        session.update_filters(|f| f.set_search("nmap"));
        let (_, card) = session.card_mut(1).unwrap();
        assert!(card.params().contains("-v"));

        // Leaving the visible set drops the card
        session.update_filters(|f| f.select_category("web-enumeration"));
        session.update_filters(|f| {
            f.select_category("network");
            f.clear_search();
        });
        let (_, card) = session.card_mut(1).unwrap();
        assert!(card.params().is_empty());
    }

    #[test]
    fn test_card_numbers_are_one_based() {
        let catalog = catalog();
        let mut session = Session::new(&catalog, InputValues::default());
        session.update_filters(|f| f.select_category("network"));
        assert!(session.card_mut(0).is_none());
        assert!(session.card_mut(1).is_some());
        assert!(session.card_mut(999).is_none());
    }

    #[test]
    fn test_wordlist_policy() {
        let catalog = catalog();
        let mut session = Session::new(&catalog, InputValues::default());
        assert!(!session.shows_wordlist_path());
        session.update_filters(|f| f.select_category("web-enumeration"));
        assert!(session.shows_wordlist_path());
    }

    #[test]
    fn test_rendered_uses_session_inputs() {
        let catalog = catalog();
        let mut session = Session::new(&catalog, InputValues::default());
        session.inputs_mut().port = "9001".to_string();
        let listener = catalog.template("nc-listener").unwrap();
        assert_eq!(session.rendered(listener), "nc -lvnp 9001");
    }
}
